/// Viewer logic behind the popup: loading, clearing and exporting the collection
use crate::flashcard::Flashcard;
use crate::store::{
    ChangeListener, FlashcardStore, StoreError, StoredCards, Subscription, clear_cards,
};
use serde::Serialize;
use std::rc::Rc;

/// File name offered for exported flashcards
pub const EXPORT_FILE_NAME: &str = "brain-booster-flashcards.json";

pub const EXPORT_MIME_TYPE: &str = "application/json";

pub const CLEAR_CONFIRMATION: &str = "Delete all flashcards?";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    /// Storage is missing, e.g. the popup page was opened as a plain tab
    Unavailable,
    /// The stored collection exists but could not be read at all
    Failed(String),
    Ready(StoredCards),
}

impl ViewState {
    pub fn cards(&self) -> &[Flashcard] {
        match self {
            ViewState::Ready(stored) => &stored.cards,
            _ => &[],
        }
    }

    /// Clearing stays possible whenever something is stored, readable or not
    pub fn can_clear(&self) -> bool {
        match self {
            ViewState::Ready(stored) => stored.total() > 0,
            ViewState::Failed(_) => true,
            ViewState::Loading | ViewState::Unavailable => false,
        }
    }
}

/// Read the whole collection into a view state.
///
/// Every store change goes through here again; there is no incremental update.
pub async fn load<S>(store: &S) -> ViewState
where
    S: FlashcardStore + ?Sized,
{
    match store.read_entries().await {
        Ok(entries) => ViewState::Ready(StoredCards::decode(&entries)),
        Err(StoreError::Unavailable) => {
            log::warn!("Flashcard storage is not available outside the extension");
            ViewState::Unavailable
        }
        Err(e) => {
            log::error!("Failed to load flashcards: {}", e);
            ViewState::Failed(e.to_string())
        }
    }
}

/// Register `on_change` for store changes, returning the unsubscribe handle
pub fn watch<S>(store: &S, on_change: impl Fn() + 'static) -> Subscription
where
    S: FlashcardStore + ?Sized,
{
    let listener: ChangeListener = Rc::new(on_change);
    store.subscribe(listener)
}

/// Empty the collection if the user confirmed. Returns whether anything was written.
pub async fn clear_all<S>(store: &S, confirmed: bool) -> bool
where
    S: FlashcardStore + ?Sized,
{
    if !confirmed {
        return false;
    }

    match clear_cards(store).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to clear flashcards: {}", e);
            false
        }
    }
}

/// Export text: the collection as 2-space indented JSON, newest first
pub fn export_document<T: Serialize>(entries: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// "1 flashcard", "0 flashcards", "3 flashcards"
pub fn count_label(count: usize) -> String {
    format!("{} flashcard{}", count, if count == 1 { "" } else { "s" })
}
