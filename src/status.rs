/// Status notifications sent from the background to the page
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message `type` tag shared by the background and content scripts
pub const STATUS_MESSAGE_TYPE: &str = "FLASHCARD_STATUS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Loading => "loading",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        }
    }

    /// Text the dispatcher sends for this kind
    pub fn dispatch_message(self) -> &'static str {
        match self {
            StatusKind::Loading => "Generating flashcard...",
            StatusKind::Success => "Flashcard saved!",
            StatusKind::Error => "Failed to generate flashcard.",
        }
    }

    /// Text the notifier shows when a message arrives without one
    pub fn fallback_message(self) -> &'static str {
        match self {
            StatusKind::Loading => "Generating...",
            StatusKind::Success => "Saved!",
            StatusKind::Error => "Error",
        }
    }
}

/// Wire shape: `{ type: "FLASHCARD_STATUS", status, message }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> StatusMessage {
        StatusMessage {
            message_type: STATUS_MESSAGE_TYPE.to_string(),
            status: kind.as_str().to_string(),
            message: Some(message.into()),
        }
    }

    /// Status message the dispatcher emits for `kind`
    pub fn for_dispatch(kind: StatusKind) -> StatusMessage {
        StatusMessage::new(kind, kind.dispatch_message())
    }

    pub fn is_status(&self) -> bool {
        self.message_type == STATUS_MESSAGE_TYPE
    }

    /// Anything other than loading or success is treated as an error
    pub fn kind(&self) -> StatusKind {
        match self.status.as_str() {
            "loading" => StatusKind::Loading,
            "success" => StatusKind::Success,
            _ => StatusKind::Error,
        }
    }

    /// Message to display, falling back per kind when absent or empty
    pub fn display_text(&self) -> String {
        match self.message.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.kind().fallback_message().to_string(),
        }
    }
}

/// A notification could not reach its page
#[derive(Debug, Error)]
#[error("status delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Identifies the page a notification is meant for
pub type TabId = i32;

/// Fire-and-forget delivery of status messages to a page.
///
/// `post` only hands the message off and returns at once. Failures that
/// happen after the hand-off stay with the sink.
pub trait StatusSink {
    fn post(&self, tab_id: TabId, message: StatusMessage) -> Result<(), DeliveryError>;
}
