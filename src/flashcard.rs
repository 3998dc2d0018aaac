/// Data structures for Brain Booster flashcards
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Topic badge text when the service gave none
pub const DEFAULT_TOPIC: &str = "General";

/// Difficulty badge text when the service gave none
pub const DEFAULT_DIFFICULTY: &str = "unknown";

/// A single persisted flashcard.
///
/// Fields the service returns beyond the known ones are kept in `extra` and
/// written back untouched, so stored and exported cards match what the
/// service produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Milliseconds since epoch, set only by the dispatcher when saving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Flashcard {
        Flashcard {
            question: question.into(),
            answer: answer.into(),
            topic: None,
            difficulty: None,
            hint: None,
            created_at: None,
            extra: Map::new(),
        }
    }

    /// Copy of this card stamped with a save time
    pub fn stamped(mut self, created_at: i64) -> Flashcard {
        self.created_at = Some(created_at);
        self
    }

    pub fn topic_label(&self) -> &str {
        non_empty(&self.topic).unwrap_or(DEFAULT_TOPIC)
    }

    pub fn difficulty_label(&self) -> &str {
        non_empty(&self.difficulty).unwrap_or(DEFAULT_DIFFICULTY)
    }

    /// Hint line for the back face, `None` when there is nothing to show
    pub fn hint_line(&self) -> Option<String> {
        non_empty(&self.hint).map(|hint| format!("Hint: {}", hint))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Current wall-clock time in milliseconds since epoch
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

/// Current wall-clock time in milliseconds since epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
