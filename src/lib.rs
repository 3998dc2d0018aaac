/// Brain Booster - Chrome Extension turning selected text into flashcards
/// Built with Rust + WASM + Yew

pub mod chrome;
pub mod config;
pub mod dispatcher;
pub mod flashcard;
pub mod generator;
pub mod notifier;
pub mod status;
pub mod store;
pub mod ui;
pub mod viewer;

use chrome::{ChromeStore, TabMessenger};
use dispatcher::Dispatcher;
use generator::HttpGenerator;
use std::rc::Rc;
use ui::viewer::{FlashcardViewer, FlashcardViewerProps};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Background service worker. background.js adds the runtime listeners during
// its first evaluation and forwards events here once the module is loaded.
#[wasm_bindgen]
pub fn handle_installed() {
    log::info!("Brain Booster installed");
    chrome::create_context_menu();
}

// One dispatch per click on our context menu entry
#[wasm_bindgen]
pub fn handle_menu_click(info: JsValue, tab: JsValue) {
    let Some((selection, tab_id)) = chrome::menu_selection(info, tab) else {
        return;
    };

    spawn_local(async move {
        let config = chrome::load_config().await;
        let dispatcher = Dispatcher::new(
            HttpGenerator::from_config(&config),
            ChromeStore::new(),
            TabMessenger,
        );
        let outcome = dispatcher.dispatch(&selection, tab_id).await;
        log::debug!("Dispatch finished: {:?}", outcome);
    });
}

// Content script: toast every status message in the page
#[wasm_bindgen]
pub fn start_content() {
    spawn_local(async {
        let config = chrome::load_config().await;
        notifier::listen(config);
    });
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    let props = FlashcardViewerProps {
        store: Rc::new(ChromeStore::new()),
    };
    yew::Renderer::<FlashcardViewer>::with_props(props).render();
}
