/// Bindings to the Chrome extension runtime
use crate::config::{Config, SETTINGS_KEY};
use crate::status::{DeliveryError, StatusMessage, StatusSink, TabId};
use crate::store::{ChangeListener, FLASHCARDS_KEY, FlashcardStore, StoreError, Subscription};
use async_trait::async_trait;
use js_sys::{Array, JSON, Object, Reflect};
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    async fn storage_get(defaults: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    async fn storage_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn add_storage_listener(listener: &Closure<dyn Fn(JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = removeListener)]
    fn remove_storage_listener(listener: &Closure<dyn Fn(JsValue, JsValue)>);

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    async fn tabs_send_message(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn add_message_listener(listener: &Closure<dyn Fn(JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "contextMenus"], js_name = create)]
    fn context_menus_create(properties: JsValue);
}

pub const MENU_ITEM_ID: &str = "brainBoosterGenerate";
pub const MENU_ITEM_TITLE: &str = "Generate Flashcard with Brain Booster";

/// Relevant part of `contextMenus.OnClickData`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuClick {
    pub menu_item_id: String,
    #[serde(default)]
    pub selection_text: Option<String>,
}

impl MenuClick {
    /// Selected text, if this click is on our entry and carries one
    pub fn selection(&self) -> Option<&str> {
        if self.menu_item_id != MENU_ITEM_ID {
            return None;
        }
        self.selection_text.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct Tab {
    #[serde(default)]
    id: Option<TabId>,
}

/// Walk `globalThis.chrome.<path>` and report whether every step exists
fn has_global_path(path: &[&str]) -> bool {
    let mut current: JsValue = js_sys::global().into();
    for key in path {
        match Reflect::get(&current, &JsValue::from_str(key)) {
            Ok(next) if !next.is_undefined() && !next.is_null() => current = next,
            _ => return false,
        }
    }
    true
}

pub fn storage_available() -> bool {
    has_global_path(&["chrome", "storage", "local"])
}

async fn get_raw(key: &str, default: &JsValue) -> Result<JsValue, StoreError> {
    if !storage_available() {
        return Err(StoreError::Unavailable);
    }

    let query = Object::new();
    Reflect::set(&query, &JsValue::from_str(key), default)
        .map_err(|e| StoreError::Backend(format!("{:?}", e)))?;

    let result = storage_get(query.into())
        .await
        .map_err(|e| StoreError::Backend(format!("{:?}", e)))?;

    Reflect::get(&result, &JsValue::from_str(key))
        .map_err(|e| StoreError::Backend(format!("{:?}", e)))
}

fn to_json_string(value: &JsValue) -> Result<String, StoreError> {
    JSON::stringify(value)
        .map(String::from)
        .map_err(|e| StoreError::Serialization(format!("{:?}", e)))
}

/// Load settings overrides from storage, falling back to defaults
pub async fn load_config() -> Config {
    let raw = match get_raw(SETTINGS_KEY, &Object::new().into()).await {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Using default settings: {}", e);
            return Config::default();
        }
    };

    match to_json_string(&raw).map(|json| Config::from_json(&json)) {
        Ok(Ok(config)) => config,
        Ok(Err(e)) => {
            log::warn!("Ignoring invalid settings: {}", e);
            Config::default()
        }
        Err(e) => {
            log::warn!("Ignoring unreadable settings: {}", e);
            Config::default()
        }
    }
}

/// The flashcard collection in `chrome.storage.local`
#[derive(Clone, Default)]
pub struct ChromeStore;

impl ChromeStore {
    pub fn new() -> ChromeStore {
        ChromeStore
    }
}

#[async_trait(?Send)]
impl FlashcardStore for ChromeStore {
    async fn read_entries(&self) -> Result<Vec<Value>, StoreError> {
        let value = get_raw(FLASHCARDS_KEY, &Array::new().into()).await?;
        if value.is_undefined() || value.is_null() {
            return Ok(Vec::new());
        }

        let json = to_json_string(&value)?;
        match serde_json::from_str(&json) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(other) => Err(StoreError::Serialization(format!(
                "expected an array under \"{}\", found {}",
                FLASHCARDS_KEY, other
            ))),
            Err(e) => Err(StoreError::Serialization(e.to_string())),
        }
    }

    async fn write_entries(&self, entries: Vec<Value>) -> Result<(), StoreError> {
        if !storage_available() {
            return Err(StoreError::Unavailable);
        }

        let json = serde_json::to_string(&entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let value =
            JSON::parse(&json).map_err(|e| StoreError::Serialization(format!("{:?}", e)))?;

        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(FLASHCARDS_KEY), &value)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))?;

        storage_set(items.into())
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }

    fn subscribe(&self, listener: ChangeListener) -> Subscription {
        if !has_global_path(&["chrome", "storage", "onChanged"]) {
            log::warn!("chrome.storage.onChanged is not available; live updates disabled");
            return Subscription::inert();
        }

        let callback =
            Closure::<dyn Fn(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
                let is_local = area.as_string().as_deref() == Some("local");
                let touches_cards =
                    Reflect::has(&changes, &JsValue::from_str(FLASHCARDS_KEY)).unwrap_or(false);
                if is_local && touches_cards {
                    listener();
                }
            });
        add_storage_listener(&callback);

        Subscription::new(move || remove_storage_listener(&callback))
    }
}

/// Delivers status messages to a tab's content script
#[derive(Clone, Default)]
pub struct TabMessenger;

impl StatusSink for TabMessenger {
    fn post(&self, tab_id: TabId, message: StatusMessage) -> Result<(), DeliveryError> {
        let value =
            serde_wasm_bindgen::to_value(&message).map_err(|e| DeliveryError(e.to_string()))?;

        spawn_local(async move {
            if let Err(e) = tabs_send_message(tab_id, value).await {
                log::debug!("Status not delivered to tab {}: {:?}", tab_id, e);
            }
        });
        Ok(())
    }
}

/// Create the selection context menu entry
pub fn create_context_menu() {
    let properties = Object::new();
    let _ = Reflect::set(&properties, &"id".into(), &MENU_ITEM_ID.into());
    let _ = Reflect::set(&properties, &"title".into(), &MENU_ITEM_TITLE.into());
    let _ = Reflect::set(&properties, &"contexts".into(), &Array::of1(&"selection".into()));
    context_menus_create(properties.into());
    log::info!("Context menu registered");
}

/// Selection and tab id of a `contextMenus.onClicked` event meant for us
pub fn menu_selection(info: JsValue, tab: JsValue) -> Option<(String, Option<TabId>)> {
    let click: MenuClick = match serde_wasm_bindgen::from_value(info) {
        Ok(click) => click,
        Err(e) => {
            log::warn!("Unexpected context menu payload: {}", e);
            return None;
        }
    };
    let selection = click.selection()?.to_string();

    let tab_id = serde_wasm_bindgen::from_value::<Tab>(tab)
        .ok()
        .and_then(|tab| tab.id);
    Some((selection, tab_id))
}

/// Call `handler` for every status message reaching this content script
pub fn on_status_message(handler: impl Fn(StatusMessage) + 'static) {
    let on_message = Closure::<dyn Fn(JsValue)>::new(move |message: JsValue| {
        match serde_wasm_bindgen::from_value::<StatusMessage>(message) {
            Ok(status) if status.is_status() => handler(status),
            _ => {}
        }
    });
    add_message_listener(&on_message);
    on_message.forget();
}
