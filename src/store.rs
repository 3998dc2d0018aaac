/// Flashcard persistence: the shared key-value store seen by every extension context
use crate::flashcard::Flashcard;
use async_trait::async_trait;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Storage key holding the flashcard collection, shared by every context
pub const FLASHCARDS_KEY: &str = "flashcards";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistent storage is not available in this context")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("stored flashcards could not be (de)serialized: {0}")]
    Serialization(String),
}

/// Called once per change batch on the flashcard key. Carries no payload:
/// observers re-read the collection themselves.
pub type ChangeListener = Rc<dyn Fn()>;

/// Handle returned by [`FlashcardStore::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Subscription {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that was never registered, e.g. when storage is missing
    pub fn inert() -> Subscription {
        Subscription { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

/// The stored collection decoded for display.
///
/// Entries that are not valid flashcards are counted but left in storage
/// exactly as they were.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredCards {
    pub cards: Vec<Flashcard>,
    pub unreadable: usize,
}

impl StoredCards {
    pub fn decode(entries: &[Value]) -> StoredCards {
        let mut stored = StoredCards::default();
        for entry in entries {
            match serde_json::from_value::<Flashcard>(entry.clone()) {
                Ok(card) => stored.cards.push(card),
                Err(e) => {
                    log::warn!("Skipping unreadable flashcard entry: {}", e);
                    stored.unreadable += 1;
                }
            }
        }
        stored
    }

    /// Number of stored entries, readable or not
    pub fn total(&self) -> usize {
        self.cards.len() + self.unreadable
    }
}

/// The persisted flashcard collection, newest first.
///
/// Entries are kept as raw JSON values so that saving a new card never
/// rewrites older ones. Reads default to an empty collection when nothing has
/// been stored yet. Writes replace the whole collection; there is no partial
/// update.
#[async_trait(?Send)]
pub trait FlashcardStore {
    async fn read_entries(&self) -> Result<Vec<Value>, StoreError>;

    async fn write_entries(&self, entries: Vec<Value>) -> Result<(), StoreError>;

    fn subscribe(&self, listener: ChangeListener) -> Subscription;

    /// Every stored entry that decodes as a flashcard
    async fn read(&self) -> Result<Vec<Flashcard>, StoreError> {
        let entries = self.read_entries().await?;
        Ok(StoredCards::decode(&entries).cards)
    }
}

/// Prepend `card` to the stored collection, leaving existing entries untouched.
///
/// This is a read followed by a separate write. Two overlapping calls can both
/// read the same snapshot, in which case the later write drops the earlier
/// call's card. A compare-and-swap at the store boundary would close this.
pub async fn prepend_card<S>(store: &S, card: Flashcard) -> Result<usize, StoreError>
where
    S: FlashcardStore + ?Sized,
{
    let entry =
        serde_json::to_value(&card).map_err(|e| StoreError::Serialization(e.to_string()))?;

    let mut entries = store.read_entries().await?;
    entries.insert(0, entry);
    let len = entries.len();
    store.write_entries(entries).await?;
    Ok(len)
}

/// Replace the stored collection with an empty one
pub async fn clear_cards<S>(store: &S) -> Result<(), StoreError>
where
    S: FlashcardStore + ?Sized,
{
    store.write_entries(Vec::new()).await
}

/// In-process store, used when running outside the extension runtime and in tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    entries: RefCell<Option<Vec<Value>>>,
    listeners: RefCell<Vec<(u64, ChangeListener)>>,
    next_id: RefCell<u64>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_entries(entries: Vec<Value>) -> MemoryStore {
        let store = MemoryStore::new();
        *store.inner.entries.borrow_mut() = Some(entries);
        store
    }

    pub fn with_cards(cards: Vec<Flashcard>) -> MemoryStore {
        let entries = cards
            .iter()
            .filter_map(|card| serde_json::to_value(card).ok())
            .collect();
        MemoryStore::with_entries(entries)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self) {
        // Snapshot so listeners may subscribe or unsubscribe while running
        let listeners: Vec<ChangeListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener();
        }
    }
}

#[async_trait(?Send)]
impl FlashcardStore for MemoryStore {
    async fn read_entries(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.inner.entries.borrow().clone().unwrap_or_default())
    }

    async fn write_entries(&self, entries: Vec<Value>) -> Result<(), StoreError> {
        *self.inner.entries.borrow_mut() = Some(entries);
        self.notify();
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) -> Subscription {
        let id = {
            let mut next_id = self.inner.next_id.borrow_mut();
            *next_id += 1;
            *next_id
        };
        self.inner.listeners.borrow_mut().push((id, listener));

        let weak: Weak<MemoryInner> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }
}
