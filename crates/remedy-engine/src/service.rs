//! Generative service boundary
//!
//! The external service is a capability, not a library: one method that
//! takes a prompt and returns text, possibly failing or rate limiting.
//! Production uses the Gemini-backed HTTP client; tests substitute a
//! scripted fake with no network dependency.

use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default public endpoint for the Gemini API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model driven by the pipeline
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Free-text completion capability
///
/// Implementations must enforce the given timeout themselves where they
/// can; the caller additionally guards every call with it.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Complete the prompt, returning the raw response text
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ServiceError>;
}

/// Sampling parameters for fix generation
///
/// Low temperature keeps snippet generation consistent across attempts.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Completion length cap
    pub max_output_tokens: u32,
    /// Nucleus sampling cutoff
    pub top_p: f32,
    /// Top-k sampling cutoff
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 16_384,
            top_p: 0.8,
            top_k: 40,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationParams,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Gemini-backed [`GenerativeService`]
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    params: GenerationParams,
}

impl GeminiClient {
    /// Create a client for the given API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            params: GenerationParams::default(),
        }
    }

    /// With a different model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With a different endpoint (used by tests against a local server)
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With different sampling parameters
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Model identifier this client drives
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ServiceError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.params,
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(timeout)
                } else {
                    ServiceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ServiceError::RateLimited);
        }
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Payload(e.to_string()))?;

        let text = payload
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        tracing::debug!(model = %self.model, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::new("key")
            .with_base_url("http://localhost:9090/")
            .with_model("gemini-test");

        assert_eq!(
            client.endpoint(),
            "http://localhost:9090/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn default_params() {
        let params = GenerationParams::default();
        assert!(params.temperature < 0.2);
        assert_eq!(params.max_output_tokens, 16_384);
    }

    #[test]
    fn response_decoding() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"File: a.py"},{"text":"\nfixed"}]}}]}"#,
        )
        .unwrap();

        let text = payload
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        assert_eq!(text, "File: a.py\nfixed");
    }

    #[test]
    fn empty_candidates_decode_to_empty_text() {
        let payload: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(payload.candidates.is_empty());
    }
}
