/// Extension settings
use serde::{Deserialize, Serialize};
use url::Url;

/// Storage key holding optional settings overrides
pub const SETTINGS_KEY: &str = "brainBoosterSettings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Flashcard generation service, receives `POST { text }`
    pub endpoint: String,
    pub toast_visible_ms: u32,
    pub toast_fade_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: "http://127.0.0.1:8000/flashcard".to_string(),
            toast_visible_ms: 2500,
            toast_fade_ms: 200,
        }
    }
}

impl Config {
    /// Parse stored overrides; fields left out keep their defaults
    pub fn from_json(raw: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn endpoint_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.toast_visible_ms, 2500);
        assert_eq!(config.toast_fade_ms, 200);
        assert_eq!(config.endpoint_url().unwrap().path(), "/flashcard");
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json(r#"{"endpoint":"https://cards.example.com/api"}"#).unwrap();

        assert_eq!(config.endpoint, "https://cards.example.com/api");
        assert_eq!(config.toast_visible_ms, 2500);
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = Config {
            endpoint: "not a url".to_string(),
            ..Config::default()
        };

        assert!(config.endpoint_url().is_err());
    }
}
