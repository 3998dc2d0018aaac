/// Client for the remote flashcard generation service
use crate::config::Config;
use crate::flashcard::Flashcard;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*`*$").expect("code fence pattern is valid")
});

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid service endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Network(String),
    #[error("malformed flashcard response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
}

/// Turns a text selection into a flashcard
#[async_trait(?Send)]
pub trait FlashcardGenerator {
    async fn generate(&self, text: &str) -> Result<Flashcard, GenerationError>;
}

pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: Result<Url, String>,
}

impl HttpGenerator {
    pub fn new(endpoint: &str) -> HttpGenerator {
        HttpGenerator::from_config(&Config {
            endpoint: endpoint.to_string(),
            ..Config::default()
        })
    }

    /// An unparsable endpoint is reported on each request, not here
    pub fn from_config(config: &Config) -> HttpGenerator {
        HttpGenerator {
            client: reqwest::Client::new(),
            endpoint: config
                .endpoint_url()
                .map_err(|e| format!("{}: {}", config.endpoint, e)),
        }
    }
}

#[async_trait(?Send)]
impl FlashcardGenerator for HttpGenerator {
    async fn generate(&self, text: &str) -> Result<Flashcard, GenerationError> {
        let endpoint = self
            .endpoint
            .clone()
            .map_err(GenerationError::InvalidEndpoint)?;

        let res = self
            .client
            .post(endpoint)
            .json(&GenerateRequest { text })
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_flashcard(&body)
    }
}

/// Parse a service body into a flashcard.
///
/// The body may arrive wrapped in a Markdown code fence. `question` and
/// `answer` must be non-empty strings; other fields pass through.
pub fn parse_flashcard(body: &str) -> Result<Flashcard, GenerationError> {
    let raw = strip_code_fence(body);

    let card: Flashcard =
        serde_json::from_str(raw).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if card.question.trim().is_empty() || card.answer.trim().is_empty() {
        return Err(GenerationError::Malformed(
            "question and answer must not be empty".to_string(),
        ));
    }

    Ok(card)
}

fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}
