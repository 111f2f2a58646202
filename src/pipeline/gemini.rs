//! Gemini HTTP client: the single request/response call to the
//! generation backend.
//!
//! One operation: prompt in, text or error out. No retries, no streaming;
//! the client is assumed pre-authenticated via its API key.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::TextGenerator;
use super::GenerateError;
use crate::config::GeminiConfig;

/// Blocking HTTP client for the Google Generative Language API.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
            timeout_secs: config.timeout_secs,
        }
    }

    /// The model name requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for `models/<model>:generateContent`.
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response body from `models/<model>:generateContent`.
#[derive(Deserialize)]
struct GenerateContentResponse {
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

impl GenerateContentResponse {
    /// Text of the first candidate. A response without candidates or parts
    /// yields an empty string; the caller folds that into the
    /// "No response generated." outcome.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GenerateError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    GenerateError::Timeout(self.timeout_secs)
                } else {
                    GenerateError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerateError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GenerateError::ResponseParsing(e.to_string()))?;

        Ok(parsed.into_text())
    }
}

// ═══════════════════════════════════════════════════════════
// Mock generator
// ═══════════════════════════════════════════════════════════

type RespondFn = dyn Fn(&str) -> Result<String, GenerateError> + Send + Sync;

/// Mock generator for tests: canned or computed responses, and a record
/// of every prompt received (call counts, prompt-content assertions).
pub struct MockGenerator {
    respond: Box<RespondFn>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Always answer with the same text.
    pub fn fixed(response: &str) -> Self {
        let response = response.to_string();
        Self::with(move |_| Ok(response.clone()))
    }

    /// Always fail with a connection error.
    pub fn failing() -> Self {
        Self::with(|_| Err(GenerateError::Connection("mock backend".to_string())))
    }

    /// Answer via a custom function of the prompt.
    pub fn with(
        respond: impl Fn(&str) -> Result<String, GenerateError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of generate calls seen so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        (self.respond)(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;

    #[test]
    fn client_trims_trailing_slash() {
        let mut config = GeminiConfig::new("key");
        config.base_url = "http://localhost:9999/".to_string();
        let client = GeminiClient::new(&config);
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn response_text_joins_candidate_parts() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Possible "},{"text":"arrhythmia."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text(), "Possible arrhythmia.");
    }

    #[test]
    fn response_without_candidates_is_empty_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.into_text(), "");

        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":null}]}"#).unwrap();
        assert_eq!(parsed.into_text(), "");
    }

    #[test]
    fn request_body_shape_matches_api() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#);
    }

    #[test]
    fn mock_fixed_records_prompts() {
        let mock = MockGenerator::fixed("ok");
        assert_eq!(mock.generate("first").unwrap(), "ok");
        assert_eq!(mock.generate("second").unwrap(), "ok");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.prompts(), vec!["first", "second"]);
    }

    #[test]
    fn mock_failing_returns_connection_error() {
        let mock = MockGenerator::failing();
        let err = mock.generate("prompt").unwrap_err();
        assert!(matches!(err, GenerateError::Connection(_)));
    }
}
