/// LLM client — the single point of entry for all Gemini API calls in the
/// scoring engine.
///
/// ARCHITECTURAL RULE: no other module may call the Gemini API directly.
/// Everything goes through the `GenerativeModel` trait so the engine can be
/// driven by a mock in tests and a different provider later.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::require_env;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Generation model, intentionally hardcoded to prevent drift.
pub const GENERATION_MODEL: &str = "gemini-2.5-flash";
/// Embedding model used by `embed_text`.
pub const EMBEDDING_MODEL: &str = "gemini-embedding-001";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("service unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The three external capabilities the engine consumes.
///
/// Generation is read-only from the engine's perspective, so retrying a
/// failed call never replays a side effect.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Plain text completion. Blocking from the caller's perspective; may fail.
    async fn generate_text(&self, prompt: &str, temperature: f32) -> Result<String, LlmError>;

    /// JSON-structured completion. The prompt must instruct the model to
    /// return valid JSON; implementations apply a tolerant fence-stripping
    /// re-parse before surfacing a parse failure.
    async fn generate_structured(&self, prompt: &str, temperature: f32)
        -> Result<Value, LlmError>;

    /// Embedding vector for `text`. `None` means embeddings are unavailable —
    /// a non-fatal condition, never an error.
    async fn embed_text(&self, text: &str) -> Option<Vec<f32>>;
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
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

impl GeminiResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini-backed implementation of `GenerativeModel`.
/// Retries 429 and 5xx responses with exponential backoff, capped at
/// `MAX_RETRIES` attempts.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Reads `GEMINI_API_KEY` from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(require_env("GEMINI_API_KEY")?))
    }

    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        json_output: bool,
    ) -> Result<String, LlmError> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: json_output.then_some("application/json"),
            },
        };

        let url = format!(
            "{GEMINI_API_BASE}/{GENERATION_MODEL}:generateContent?key={}",
            self.api_key
        );

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(&request_body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let gemini_response: GeminiResponse = response.json().await?;
            let text = gemini_response.text().ok_or(LlmError::EmptyContent)?;

            debug!("LLM call succeeded ({} chars)", text.len());
            return Ok(text.to_string());
        }

        Err(last_error.unwrap_or(LlmError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_text(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        self.generate(prompt, temperature, false).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<Value, LlmError> {
        let text = self.generate(prompt, temperature, true).await?;
        parse_structured(&text)
    }

    async fn embed_text(&self, text: &str) -> Option<Vec<f32>> {
        let url = format!(
            "{GEMINI_API_BASE}/{EMBEDDING_MODEL}:embedContent?key={}",
            self.api_key
        );
        let body = serde_json::json!({
            "content": { "parts": [{ "text": text }] }
        });

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("embedding request failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("embedding request returned {}", response.status());
            return None;
        }

        match response.json::<EmbedResponse>().await {
            Ok(parsed) => Some(parsed.embedding.values),
            Err(e) => {
                warn!("embedding response unreadable: {e}");
                None
            }
        }
    }
}

/// Tolerant structured-output parse: try the text as-is, then retry with
/// markdown code fences stripped.
pub fn parse_structured(text: &str) -> Result<Value, LlmError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_structured_plain_json() {
        let value = parse_structured(r#"{"role_alignment": 80}"#).unwrap();
        assert_eq!(value["role_alignment"], 80);
    }

    #[test]
    fn test_parse_structured_fenced_json() {
        let value = parse_structured("```json\n{\"content_quality\": 65}\n```").unwrap();
        assert_eq!(value["content_quality"], 65);
    }

    #[test]
    fn test_parse_structured_garbage_fails() {
        assert!(parse_structured("not json").is_err());
    }

    #[test]
    fn test_gemini_response_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "python, sql"}]}}
            ]
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), Some("python, sql"));
    }

    #[test]
    fn test_gemini_response_without_candidates() {
        let parsed: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.text(), None);
    }
}
