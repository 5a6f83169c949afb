//! Language model clients.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language model errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Cannot reach language model at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Language model API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Missing API key")]
    MissingApiKey,
}

pub type LlmResult<T> = Result<T, LlmError>;

/// A text-in, text-out generative model.
///
/// Implementations are blocking; async callers run them on a blocking thread.
pub trait LanguageModel: Send + Sync {
    /// Generate a reply for a single prompt.
    fn generate(&self, prompt: &str) -> LlmResult<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,
    /// Model name (e.g. "gemini-flash-latest")
    pub model: String,
    /// API key
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-flash-latest".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

/// Google Gemini REST client (`generateContent`).
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Build a client. Fails when no API key is configured.
    pub fn new(config: GeminiConfig) -> LlmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> LlmResult<String> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".into()))?;

    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    if text.is_empty() {
        return Err(LlmError::InvalidResponse("Empty candidate text".into()));
    }
    Ok(text)
}

impl LanguageModel for GeminiClient {
    fn generate(&self, prompt: &str) -> LlmResult<String> {
        tracing::debug!(model = %self.config.model, prompt_chars = prompt.len(), "Sending prompt");

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.config.endpoint.clone())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(model = %self.config.model, status = status.as_u16(), "Language model request rejected");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        first_candidate_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Mock model for testing: returns a canned reply and records prompts.
pub struct MockLanguageModel {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockLanguageModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model whose every call fails with a connection error.
    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl LanguageModel for MockLanguageModel {
    fn generate(&self, prompt: &str) -> LlmResult<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply.clone().map_err(LlmError::Connection)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_rejected() {
        let result = GeminiClient::new(GeminiConfig::default());
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_generate_url() {
        let client = GeminiClient::new(GeminiConfig {
            endpoint: "http://localhost:9999/".into(),
            api_key: "k".into(),
            ..GeminiConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.generate_url(),
            "http://localhost:9999/v1beta/models/gemini-flash-latest:generateContent"
        );
    }

    #[test]
    fn test_parse_candidate_text() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Take with "},{"text":"water."}],"role":"model"}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_candidate_text(parsed).unwrap(), "Take with water.");
    }

    #[test]
    fn test_parse_no_candidates() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(matches!(
            first_candidate_text(parsed),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_mock_records_prompts() {
        let model = MockLanguageModel::new("ok");
        assert_eq!(model.generate("hello").unwrap(), "ok");
        assert_eq!(model.prompts(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_mock_failing() {
        let model = MockLanguageModel::failing("offline");
        assert!(matches!(model.generate("x"), Err(LlmError::Connection(_))));
        assert_eq!(model.prompts().len(), 1);
    }

    #[test]
    fn test_unreachable_endpoint() {
        let client = GeminiClient::new(GeminiConfig {
            endpoint: "http://127.0.0.1:1".into(),
            api_key: "k".into(),
            timeout_secs: 2,
            ..GeminiConfig::default()
        })
        .unwrap();
        assert!(client.generate("hi").is_err());
    }
}
