//! Model invocation: the two call shapes against the Gemini API.
//!
//! The generative model is an opaque external capability — "given bytes
//! plus instructions, return text" — so it hides behind the narrow
//! [`GenerativeModel`] trait. Tests swap in a scripted mock; production
//! uses [`GeminiClient`] over reqwest.
//!
//! This module is intentionally thin: no retries, no fallback. The
//! direct-vs-text-fallback policy lives one layer up in
//! [`crate::analyze`], where the original error can be preserved across
//! the fallback branch.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Which invocation shape produced the model's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Original document bytes sent as a multimodal attachment.
    Direct,
    /// Extracted plain text quoted inside the prompt.
    TextFallback,
}

/// The generative-AI capability, reduced to its two call shapes.
///
/// Failure mode: any transport, quota, or content-safety rejection
/// surfaces as [`AnalysisError::ModelInvocation`] carrying the underlying
/// cause. Implementations must not retry — that policy belongs to the
/// pipeline.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Attachment-based invocation: base64 payload + media type + prompt.
    async fn generate_with_media(
        &self,
        payload_b64: &str,
        media_type: &str,
        prompt: &str,
    ) -> Result<String, AnalysisError>;

    /// Plain-text invocation: the prompt carries everything.
    async fn generate_text(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Default API base for the Gemini REST endpoint.
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini REST client implementing [`GenerativeModel`].
///
/// Calls `v1beta/models/{model}:generateContent` with `inline_data` /
/// `text` parts. The per-call timeout is applied here because the API
/// offers no intrinsic latency bound.
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Build a client from the resolved API key and the pipeline config.
    pub fn new(api_key: String, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Point the client at a different API base (local stub servers).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// POST the given `parts` array and pull the first candidate's text.
    async fn generate(&self, parts: Vec<Value>) -> Result<String, AnalysisError> {
        let body = request_body(parts, self.temperature, self.max_output_tokens);
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::ModelInvocation {
                detail: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ModelInvocation {
                detail: format!("Gemini API error {status}: {error_body}"),
            });
        }

        let decoded: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::ModelInvocation {
                    detail: format!("malformed API response: {e}"),
                })?;

        let text = decoded.first_text().ok_or_else(|| AnalysisError::ModelInvocation {
            detail: "no text in model response (content filtered or empty candidate)".to_string(),
        })?;

        debug!(model = %self.model, response_chars = text.len(), "Model responded");
        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_with_media(
        &self,
        payload_b64: &str,
        media_type: &str,
        prompt: &str,
    ) -> Result<String, AnalysisError> {
        self.generate(vec![media_part(payload_b64, media_type), text_part(prompt)])
            .await
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, AnalysisError> {
        self.generate(vec![text_part(prompt)]).await
    }
}

// ── Request construction ─────────────────────────────────────────────────

fn media_part(payload_b64: &str, media_type: &str) -> Value {
    json!({
        "inline_data": {
            "mime_type": media_type,
            "data": payload_b64,
        }
    })
}

fn text_part(text: &str) -> Value {
    json!({ "text": text })
}

fn request_body(parts: Vec<Value>, temperature: f32, max_output_tokens: u32) -> Value {
    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "temperature": temperature,
            "maxOutputTokens": max_output_tokens,
        }
    })
}

// ── Response decoding ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first text part, if any.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_part_shape() {
        let part = media_part("QUJD", "application/pdf");
        assert_eq!(part["inline_data"]["mime_type"], "application/pdf");
        assert_eq!(part["inline_data"]["data"], "QUJD");
    }

    #[test]
    fn request_body_carries_generation_config() {
        let body = request_body(vec![text_part("hello")], 0.1, 4096);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn first_text_walks_candidates() {
        let decoded: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"summary\":\"ok\"}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(decoded.first_text().unwrap(), "{\"summary\":\"ok\"}");
    }

    #[test]
    fn empty_candidates_yield_none() {
        let decoded: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(decoded.first_text().is_none());

        let filtered: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": null }]
        }))
        .unwrap();
        assert!(filtered.first_text().is_none());
    }
}
