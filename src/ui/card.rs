/// Two-sided flashcard that flips on click

use crate::flashcard::Flashcard;
use wasm_bindgen::JsValue;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FlashcardCardProps {
    pub card: Flashcard,
}

#[function_component(FlashcardCard)]
pub fn flashcard_card(props: &FlashcardCardProps) -> Html {
    // Presentational only, never persisted
    let flipped = use_state(|| false);
    let card = &props.card;

    let on_flip = {
        let flipped = flipped.clone();
        Callback::from(move |_: MouseEvent| {
            flipped.set(!*flipped);
        })
    };

    let created = card.created_at.map(format_time).unwrap_or_default();

    html! {
        <div class="card-outer">
            <div class={classes!("card", (*flipped).then_some("flipped"))} onclick={on_flip}>
                <div class="card-inner">
                    <div class="card-face card-front">
                        <div class="card-question-label">{"Question"}</div>
                        <p class="card-question">{&card.question}</p>
                        <div class="card-meta">
                            <span class="badge badge-topic">{card.topic_label()}</span>
                            <span class="badge badge-difficulty">{card.difficulty_label()}</span>
                        </div>
                    </div>
                    <div class="card-face card-back">
                        <div class="card-question-label">{"Answer"}</div>
                        <p class="card-answer">{&card.answer}</p>
                        if let Some(hint) = card.hint_line() {
                            <p class="hint">{hint}</p>
                        }
                        <div class="card-meta">
                            <span>{created}</span>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

/// Hour and minute in the browser's default locale
fn format_time(timestamp: i64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(timestamp as f64));

    let options = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&options, &"hour".into(), &"2-digit".into());
    let _ = js_sys::Reflect::set(&options, &"minute".into(), &"2-digit".into());

    date.to_locale_time_string_with_options("default", &options).into()
}
