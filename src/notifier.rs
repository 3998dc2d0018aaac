/// In-page toast notifications for flashcard status
use crate::config::Config;
use crate::status::{StatusKind, StatusMessage};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

pub const CONTAINER_ID: &str = "brain-booster-toast-container";

const CONTAINER_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("bottom", "24px"),
    ("right", "24px"),
    ("z-index", "2147483647"),
    ("display", "flex"),
    ("flex-direction", "column"),
    ("gap", "8px"),
];

const TOAST_STYLE: &[(&str, &str)] = &[
    ("padding", "10px 14px"),
    ("border-radius", "999px"),
    ("font-size", "13px"),
    ("font-family", "system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif"),
    ("box-shadow", "0 4px 12px rgba(0,0,0,0.18)"),
    ("color", "#ffffff"),
    ("opacity", "0"),
    ("transform", "translateY(10px)"),
    ("transition", "opacity 0.2s ease-out, transform 0.2s ease-out"),
];

/// What a single toast looks like and how long it stays
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: StatusKind,
    pub text: String,
    pub visible_ms: u32,
    pub fade_ms: u32,
}

impl Toast {
    pub fn from_message(message: &StatusMessage, config: &Config) -> Toast {
        Toast {
            kind: message.kind(),
            text: message.display_text(),
            visible_ms: config.toast_visible_ms,
            fade_ms: config.toast_fade_ms,
        }
    }

    /// Informational blue, affirmative green, negative red
    pub fn background(&self) -> &'static str {
        match self.kind {
            StatusKind::Loading => "linear-gradient(135deg, #1d4ed8, #3b82f6)",
            StatusKind::Success => "linear-gradient(135deg, #15803d, #22c55e)",
            StatusKind::Error => "linear-gradient(135deg, #b91c1c, #ef4444)",
        }
    }
}

/// Listen for status messages and toast each one in the current page
pub fn listen(config: Config) {
    crate::chrome::on_status_message(move |message| {
        show(&Toast::from_message(&message, &config));
    });
}

/// Render `toast` if the page has a body; silently does nothing otherwise
pub fn show(toast: &Toast) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if let Err(e) = render(&document, toast) {
        log::debug!("Could not show toast: {:?}", e);
    }
}

fn render(document: &Document, toast: &Toast) -> Result<(), JsValue> {
    let Some(container) = toast_container(document)? else {
        return Ok(());
    };

    let element: HtmlElement = document.create_element("div")?.dyn_into()?;
    element.set_text_content(Some(&toast.text));
    element.set_attribute("data-status", toast.kind.as_str())?;
    apply_style(&element, TOAST_STYLE)?;
    element.style().set_property("background", toast.background())?;
    container.append_child(&element)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let shown = element.clone();
    let fade_in = Closure::once_into_js(move || {
        let _ = shown.style().set_property("opacity", "1");
        let _ = shown.style().set_property("transform", "translateY(0)");
    });
    window.request_animation_frame(fade_in.unchecked_ref())?;

    let fade_ms = toast.fade_ms as i32;
    let fading = element.clone();
    let fade_out = Closure::once_into_js(move || {
        let _ = fading.style().set_property("opacity", "0");
        let _ = fading.style().set_property("transform", "translateY(10px)");

        let remove = Closure::once_into_js(move || fading.remove());
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                remove.unchecked_ref(),
                fade_ms,
            );
        }
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        fade_out.unchecked_ref(),
        toast.visible_ms as i32,
    )?;

    Ok(())
}

/// Shared stacking container, created on first use
fn toast_container(document: &Document) -> Result<Option<HtmlElement>, JsValue> {
    if let Some(existing) = document.get_element_by_id(CONTAINER_ID) {
        return Ok(Some(existing.dyn_into()?));
    }

    let Some(body) = document.body() else {
        return Ok(None);
    };

    let container: HtmlElement = document.create_element("div")?.dyn_into()?;
    container.set_id(CONTAINER_ID);
    apply_style(&container, CONTAINER_STYLE)?;
    body.append_child(&container)?;
    Ok(Some(container))
}

fn apply_style(element: &HtmlElement, rules: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (property, value) in rules {
        style.set_property(property, value)?;
    }
    Ok(())
}
