/// Popup listing every stored flashcard, kept live by storage change events

use crate::store::FlashcardStore;
use crate::ui::card::FlashcardCard;
use crate::ui::components::{CountLabel, EmptyState};
use crate::viewer::{self, CLEAR_CONFIRMATION, EXPORT_FILE_NAME, EXPORT_MIME_TYPE, ViewState};
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};
use yew::prelude::*;

#[derive(Properties, Clone)]
pub struct FlashcardViewerProps {
    pub store: Rc<dyn FlashcardStore>,
}

impl PartialEq for FlashcardViewerProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

#[function_component(FlashcardViewer)]
pub fn flashcard_viewer(props: &FlashcardViewerProps) -> Html {
    let state = use_state(|| ViewState::Loading);

    // Initial load plus a full re-read on every change to the collection
    {
        let state = state.clone();
        let store = props.store.clone();

        use_effect_with((), move |_| {
            let watched = store.clone();
            let refresh = move || {
                let state = state.clone();
                let store = store.clone();
                spawn_local(async move {
                    state.set(viewer::load(&*store).await);
                });
            };
            refresh();

            let subscription = viewer::watch(&*watched, refresh);
            move || drop(subscription)
        });
    }

    let on_clear = {
        let state = state.clone();
        let store = props.store.clone();

        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message(CLEAR_CONFIRMATION).ok())
                .unwrap_or(false);

            let state = state.clone();
            let store = store.clone();
            spawn_local(async move {
                if viewer::clear_all(&*store, confirmed).await {
                    state.set(viewer::load(&*store).await);
                }
            });
        })
    };

    let on_export = {
        let store = props.store.clone();

        Callback::from(move |_| {
            let store = store.clone();
            spawn_local(async move {
                let entries = match store.read_entries().await {
                    Ok(entries) => entries,
                    Err(e) => {
                        log::warn!("Export skipped: {}", e);
                        return;
                    }
                };

                match viewer::export_document(&entries) {
                    Ok(json) => {
                        if let Err(e) = download(&json, EXPORT_FILE_NAME) {
                            log::error!("Export failed: {:?}", e);
                        }
                    }
                    Err(e) => log::error!("Export failed: {}", e),
                }
            });
        })
    };

    let cards = state.cards();
    let is_ready = matches!(*state, ViewState::Ready(_));

    html! {
        <div class="padding-20">
            <div class="header">
                <h1 class="popup-title">{"Brain Booster"}</h1>
                <CountLabel label={viewer::count_label(cards.len())} />
            </div>

            <div class="toolbar">
                <Button
                    onclick={on_export}
                    disabled={!is_ready}
                    variant={ButtonVariant::Secondary}
                >
                    {"Export"}
                </Button>
                <Button
                    onclick={on_clear}
                    disabled={!state.can_clear()}
                    variant={ButtonVariant::Danger}
                >
                    {"Clear all"}
                </Button>
            </div>

            {match &*state {
                ViewState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                ViewState::Unavailable => html! {
                    <Alert r#type={AlertType::Warning} title={"Storage unavailable"} inline={true}>
                        {"Open this page from the Brain Booster extension icon."}
                    </Alert>
                },
                ViewState::Failed(reason) => html! {
                    <Alert
                        r#type={AlertType::Danger}
                        title={"Flashcards could not be read"}
                        inline={true}
                    >
                        {format!("{}. Clearing the collection starts it over.", reason)}
                    </Alert>
                },
                ViewState::Ready(stored) => html! {
                    <>
                        if stored.unreadable > 0 {
                            <Alert
                                r#type={AlertType::Warning}
                                title={"Some entries were skipped"}
                                inline={true}
                            >
                                {unreadable_notice(stored.unreadable)}
                            </Alert>
                        }
                        if stored.cards.is_empty() {
                            <EmptyState
                                message={"No flashcards yet."}
                                hint={Some(EMPTY_HINT.to_string())}
                            />
                        } else {
                            <div id="cards-container" class="cards-container">
                                {for stored.cards.iter().map(|card| html! {
                                    <FlashcardCard card={card.clone()} />
                                })}
                            </div>
                        }
                    </>
                },
            }}
        </div>
    }
}

const EMPTY_HINT: &str = "Select text on a page and choose \"Generate Flashcard\".";

fn unreadable_notice(count: usize) -> String {
    if count == 1 {
        "1 stored entry is not a valid flashcard and is not shown.".to_string()
    } else {
        format!("{} stored entries are not valid flashcards and are not shown.", count)
    }
}

/// Offer `data` as a file download through a short-lived object URL
fn download(data: &str, filename: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(data));
    let options = BlobPropertyBag::new();
    options.set_type(EXPORT_MIME_TYPE);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;

    let url = Url::create_object_url_with_blob(&blob)?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    Url::revoke_object_url(&url)
}
