/// Command dispatcher: selection in, flashcard stored, status out
use crate::flashcard::{Flashcard, now_millis};
use crate::generator::FlashcardGenerator;
use crate::status::{StatusKind, StatusMessage, StatusSink, TabId};
use crate::store::{FlashcardStore, prepend_card};

/// Result of one dispatcher invocation
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The card was stored at the head of the collection
    Saved(Flashcard),
    /// Generation or persistence failed; the user was told
    Failed(String),
    /// Nothing to do (empty selection)
    Ignored,
}

pub struct Dispatcher<G, S, N> {
    generator: G,
    store: S,
    sink: N,
    clock: fn() -> i64,
}

impl<G, S, N> Dispatcher<G, S, N>
where
    G: FlashcardGenerator,
    S: FlashcardStore,
    N: StatusSink,
{
    pub fn new(generator: G, store: S, sink: N) -> Self {
        Dispatcher {
            generator,
            store,
            sink,
            clock: now_millis,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Run one generate-and-save cycle for `selection`.
    ///
    /// Steps run strictly in order: loading notice, service request, then
    /// either store-and-success or an error notice. Invocations are
    /// independent; overlapping ones may race on the store (see
    /// [`prepend_card`]). Never retries and never returns an error.
    pub async fn dispatch(&self, selection: &str, tab_id: Option<TabId>) -> DispatchOutcome {
        let text = selection.trim();
        if text.is_empty() {
            log::debug!("Ignoring empty selection");
            return DispatchOutcome::Ignored;
        }

        self.notify(tab_id, StatusKind::Loading);

        let card = match self.generator.generate(text).await {
            Ok(card) => card,
            Err(e) => {
                log::error!("Error generating flashcard: {}", e);
                self.notify(tab_id, StatusKind::Error);
                return DispatchOutcome::Failed(e.to_string());
            }
        };

        let card = card.stamped((self.clock)());

        match prepend_card(&self.store, card.clone()).await {
            Ok(count) => {
                log::info!("Flashcard saved ({} total)", count);
                self.notify(tab_id, StatusKind::Success);
                DispatchOutcome::Saved(card)
            }
            Err(e) => {
                log::error!("Error saving flashcard: {}", e);
                self.notify(tab_id, StatusKind::Error);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Best-effort delivery; a closed or unreachable page is not a failure
    fn notify(&self, tab_id: Option<TabId>, kind: StatusKind) {
        let Some(tab_id) = tab_id else {
            return;
        };

        if let Err(e) = self.sink.post(tab_id, StatusMessage::for_dispatch(kind)) {
            log::debug!("Status not delivered to tab {}: {}", tab_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationError, HttpGenerator};
    use crate::status::DeliveryError;
    use crate::store::{MemoryStore, StoreError, Subscription};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Rc<RefCell<Vec<(TabId, StatusMessage)>>>,
        unreachable: bool,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<StatusKind> {
            self.sent.borrow().iter().map(|(_, msg)| msg.kind()).collect()
        }
    }

    impl StatusSink for RecordingSink {
        fn post(&self, tab_id: TabId, message: StatusMessage) -> Result<(), DeliveryError> {
            if self.unreachable {
                return Err(DeliveryError("Receiving end does not exist".to_string()));
            }
            self.sent.borrow_mut().push((tab_id, message));
            Ok(())
        }
    }

    struct FixedGenerator {
        result: fn() -> Result<Flashcard, GenerationError>,
        calls: Cell<usize>,
    }

    impl FixedGenerator {
        fn new(result: fn() -> Result<Flashcard, GenerationError>) -> Self {
            FixedGenerator {
                result,
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl FlashcardGenerator for FixedGenerator {
        async fn generate(&self, _text: &str) -> Result<Flashcard, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            (self.result)()
        }
    }

    struct BrokenStore;

    #[async_trait(?Send)]
    impl FlashcardStore for BrokenStore {
        async fn read_entries(&self) -> Result<Vec<Value>, StoreError> {
            Err(StoreError::Unavailable)
        }

        async fn write_entries(&self, _entries: Vec<Value>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }

        fn subscribe(&self, _listener: crate::store::ChangeListener) -> Subscription {
            Subscription::inert()
        }
    }

    fn mitochondria() -> Result<Flashcard, GenerationError> {
        Ok(Flashcard::new("What is the powerhouse of the cell?", "Mitochondria"))
    }

    fn server_error() -> Result<Flashcard, GenerationError> {
        Err(GenerationError::Status {
            status: 500,
            body: "boom".to_string(),
        })
    }

    #[tokio::test]
    async fn test_success_prepends_stamped_card() {
        let store = MemoryStore::with_cards(vec![Flashcard::new("older", "card")]);
        let sink = RecordingSink::default();
        let dispatcher =
            Dispatcher::new(FixedGenerator::new(mitochondria), store.clone(), sink.clone());
        let started = now_millis();

        let outcome = dispatcher
            .dispatch("  Mitochondria is the powerhouse of the cell ", Some(7))
            .await;

        let cards = store.read().await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "What is the powerhouse of the cell?");
        assert_eq!(cards[0].answer, "Mitochondria");
        assert!(cards[0].created_at.unwrap() >= started);
        assert_eq!(cards[1].question, "older");
        assert_eq!(outcome, DispatchOutcome::Saved(cards[0].clone()));
        assert_eq!(sink.kinds(), vec![StatusKind::Loading, StatusKind::Success]);
        assert!(sink.sent.borrow().iter().all(|(tab, _)| *tab == 7));
    }

    #[tokio::test]
    async fn test_failure_leaves_store_untouched() {
        let store = MemoryStore::with_cards(vec![Flashcard::new("older", "card")]);
        let sink = RecordingSink::default();
        let dispatcher =
            Dispatcher::new(FixedGenerator::new(server_error), store.clone(), sink.clone());

        let outcome = dispatcher.dispatch("some text", Some(1)).await;

        let cards = store.read().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert_eq!(sink.kinds(), vec![StatusKind::Loading, StatusKind::Error]);
        assert_eq!(
            sink.sent.borrow()[1].1.message.as_deref(),
            Some("Failed to generate flashcard.")
        );
    }

    #[tokio::test]
    async fn test_empty_selection_is_ignored() {
        let generator = FixedGenerator::new(mitochondria);
        let sink = RecordingSink::default();
        let dispatcher = Dispatcher::new(generator, MemoryStore::new(), sink.clone());

        let outcome = dispatcher.dispatch("   \n", Some(1)).await;

        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert_eq!(dispatcher.generator.calls.get(), 0);
        assert!(sink.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_page_does_not_fail() {
        let store = MemoryStore::new();
        let sink = RecordingSink {
            unreachable: true,
            ..RecordingSink::default()
        };
        let dispatcher = Dispatcher::new(FixedGenerator::new(mitochondria), store.clone(), sink);

        let outcome = dispatcher.dispatch("text", Some(3)).await;

        assert!(matches!(outcome, DispatchOutcome::Saved(_)));
        assert_eq!(store.read().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_tab_skips_notifications() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let dispatcher =
            Dispatcher::new(FixedGenerator::new(mitochondria), store.clone(), sink.clone());

        let outcome = dispatcher.dispatch("text", None).await;

        assert!(matches!(outcome, DispatchOutcome::Saved(_)));
        assert!(sink.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_reports_error() {
        let sink = RecordingSink::default();
        let dispatcher =
            Dispatcher::new(FixedGenerator::new(mitochondria), BrokenStore, sink.clone());

        let outcome = dispatcher.dispatch("text", Some(1)).await;

        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert_eq!(sink.kinds(), vec![StatusKind::Loading, StatusKind::Error]);
    }

    #[tokio::test]
    async fn test_clock_stamps_created_at() {
        let store = MemoryStore::new();
        let dispatcher = Dispatcher::new(
            FixedGenerator::new(mitochondria),
            store.clone(),
            RecordingSink::default(),
        )
        .with_clock(|| 42);

        dispatcher.dispatch("text", None).await;

        assert_eq!(store.read().await.unwrap()[0].created_at, Some(42));
    }

    #[tokio::test]
    async fn test_open_viewer_is_notified_of_new_card() {
        let store = MemoryStore::new();
        let changes = Rc::new(Cell::new(0));
        let counter = changes.clone();
        let _sub = store.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        let dispatcher = Dispatcher::new(
            FixedGenerator::new(mitochondria),
            store.clone(),
            RecordingSink::default(),
        );

        dispatcher.dispatch("text", Some(1)).await;

        assert_eq!(changes.get(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/flashcard")
            .with_status(200)
            .with_body(
                r#"{"question":"What is the powerhouse of the cell?","answer":"Mitochondria"}"#,
            )
            .create_async()
            .await;
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let generator = HttpGenerator::new(&format!("{}/flashcard", server.url()));
        let dispatcher = Dispatcher::new(generator, store.clone(), sink.clone());

        dispatcher
            .dispatch("Mitochondria is the powerhouse of the cell", Some(1))
            .await;

        let cards = store.read().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].answer, "Mitochondria");
        assert!(cards[0].created_at.is_some());
        assert_eq!(sink.kinds(), vec![StatusKind::Loading, StatusKind::Success]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_end_to_end_http_500() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/flashcard")
            .with_status(500)
            .create_async()
            .await;
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let generator = HttpGenerator::new(&format!("{}/flashcard", server.url()));
        let dispatcher = Dispatcher::new(generator, store.clone(), sink.clone());

        dispatcher.dispatch("some text", Some(1)).await;

        assert!(store.read().await.unwrap().is_empty());
        assert_eq!(sink.kinds().last(), Some(&StatusKind::Error));
    }

    #[tokio::test]
    async fn test_loading_notice_is_posted_before_generation() {
        struct WatchingGenerator {
            sink: RecordingSink,
            seen_before: Cell<Option<Vec<StatusKind>>>,
        }

        #[async_trait(?Send)]
        impl FlashcardGenerator for WatchingGenerator {
            async fn generate(&self, _text: &str) -> Result<Flashcard, GenerationError> {
                self.seen_before.set(Some(self.sink.kinds()));
                mitochondria()
            }
        }

        let sink = RecordingSink::default();
        let generator = WatchingGenerator {
            sink: sink.clone(),
            seen_before: Cell::new(None),
        };
        let dispatcher = Dispatcher::new(generator, MemoryStore::new(), sink.clone());

        dispatcher.dispatch("text", Some(1)).await;

        assert_eq!(
            dispatcher.generator.seen_before.take(),
            Some(vec![StatusKind::Loading])
        );
        assert_eq!(sink.kinds(), vec![StatusKind::Loading, StatusKind::Success]);
    }

    #[tokio::test]
    async fn test_saves_despite_unreadable_stored_entry() {
        let legacy = json!({"question": "legacy entry"});
        let good = json!({"question": "good", "answer": "1"});
        let store = MemoryStore::with_entries(vec![good, legacy.clone()]);
        let sink = RecordingSink::default();
        let dispatcher =
            Dispatcher::new(FixedGenerator::new(mitochondria), store.clone(), sink.clone());

        let outcome = dispatcher.dispatch("text", Some(1)).await;

        assert!(matches!(outcome, DispatchOutcome::Saved(_)));
        let entries = store.read_entries().await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], legacy);
        assert_eq!(sink.kinds(), vec![StatusKind::Loading, StatusKind::Success]);
    }
}
