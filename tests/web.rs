//! Browser-only checks, run with `wasm-pack test --headless --chrome`
#![cfg(target_arch = "wasm32")]

use brain_booster::chrome::{self, ChromeStore};
use brain_booster::flashcard::Flashcard;
use brain_booster::notifier::{self, CONTAINER_ID, Toast};
use brain_booster::status::StatusKind;
use brain_booster::store::{FlashcardStore, MemoryStore, StoreError, clear_cards};
use brain_booster::ui::card::{FlashcardCard, FlashcardCardProps};
use brain_booster::ui::viewer::{FlashcardViewer, FlashcardViewerProps};
use brain_booster::viewer::{self, ViewState};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn toasts_stack_in_one_container() {
    let loading = Toast {
        kind: StatusKind::Loading,
        text: "Generating...".to_string(),
        visible_ms: 2500,
        fade_ms: 200,
    };
    let error = Toast {
        kind: StatusKind::Error,
        text: "Error".to_string(),
        ..loading.clone()
    };

    notifier::show(&loading);
    notifier::show(&error);

    let document = web_sys::window().unwrap().document().unwrap();
    let container = document.get_element_by_id(CONTAINER_ID).unwrap();
    assert_eq!(container.child_element_count(), 2);

    let last = container.last_element_child().unwrap();
    assert_eq!(last.text_content().unwrap(), "Error");
    assert_eq!(last.get_attribute("data-status").as_deref(), Some("error"));
}

#[wasm_bindgen_test]
async fn store_is_unavailable_outside_the_extension() {
    assert!(!chrome::storage_available());

    let store = ChromeStore::new();
    assert!(matches!(store.read().await, Err(StoreError::Unavailable)));
    assert_eq!(viewer::load(&store).await, ViewState::Unavailable);
    assert!(!viewer::clear_all(&store, true).await);
}

fn mount_point() -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    root
}

async fn settle() {
    yew::platform::time::sleep(Duration::from_millis(50)).await;
}

fn has_class(element: &Element, class: &str) -> bool {
    element.class_name().split_whitespace().any(|c| c == class)
}

#[wasm_bindgen_test]
async fn card_flips_and_omits_missing_hint() {
    let root = mount_point();
    let props = FlashcardCardProps {
        card: Flashcard::new("What is the powerhouse of the cell?", "Mitochondria"),
    };
    yew::Renderer::<FlashcardCard>::with_root_and_props(root.clone(), props).render();
    settle().await;

    assert!(root.query_selector(".hint").unwrap().is_none());
    let badges = root.query_selector(".badge-topic").unwrap().unwrap();
    assert_eq!(badges.text_content().unwrap(), "General");

    let card = root.query_selector(".card").unwrap().unwrap();
    assert!(!has_class(&card, "flipped"));

    card.clone().dyn_into::<HtmlElement>().unwrap().click();
    settle().await;

    assert!(has_class(&card, "flipped"));
}

#[wasm_bindgen_test]
async fn viewer_shows_empty_state_after_clear() {
    let store = MemoryStore::with_cards(vec![
        Flashcard::new("What is the powerhouse of the cell?", "Mitochondria"),
        Flashcard::new("2 + 2?", "4"),
    ]);
    let root = mount_point();
    let props = FlashcardViewerProps {
        store: Rc::new(store.clone()),
    };
    yew::Renderer::<FlashcardViewer>::with_root_and_props(root.clone(), props).render();
    settle().await;

    let cards = root.query_selector("#cards-container").unwrap().unwrap();
    assert_eq!(cards.child_element_count(), 2);
    let count = root.query_selector("#count-label").unwrap().unwrap();
    assert_eq!(count.text_content().unwrap(), "2 flashcards");

    clear_cards(&store).await.unwrap();
    settle().await;

    assert!(root.query_selector("#cards-container").unwrap().is_none());
    assert!(root.query_selector("#empty-state").unwrap().is_some());
    let count = root.query_selector("#count-label").unwrap().unwrap();
    assert_eq!(count.text_content().unwrap(), "0 flashcards");
}

#[wasm_bindgen_test]
fn menu_clicks_are_filtered_by_entry_and_selection() {
    let ours = js_sys::JSON::parse(
        r#"{"menuItemId":"brainBoosterGenerate","selectionText":"ATP synthase"}"#,
    )
    .unwrap();
    let tab = js_sys::JSON::parse(r#"{"id":12}"#).unwrap();
    assert_eq!(
        chrome::menu_selection(ours, tab),
        Some(("ATP synthase".to_string(), Some(12)))
    );

    let other = js_sys::JSON::parse(r#"{"menuItemId":"other","selectionText":"x"}"#).unwrap();
    assert_eq!(chrome::menu_selection(other, wasm_bindgen::JsValue::UNDEFINED), None);
}
