//! LLM client — the single point of entry for all Claude API calls.
//!
//! No other module may call the Anthropic API directly; question generation
//! and résumé structuring both go through here. Callers pass per-call
//! sampling parameters because the two workloads want different settings
//! (initial questions run cooler and longer than follow-ups).

use anyhow::Result;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls. Intentionally hardcoded to prevent drift.
pub const MODEL: &str = "claude-3-5-sonnet-20241022";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No JSON object in LLM output")]
    NoJson,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Per-call sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct CallParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CallParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for the Anthropic Messages API with retry on 429/5xx.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self { client, api_key })
    }

    /// Calls the Messages API and returns the plain text of the reply.
    /// Retries on 429 and 5xx with exponential backoff; other API errors
    /// return immediately.
    pub async fn complete(&self, prompt: &str, params: CallParams) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, text);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: text,
                });
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&text)
                    .map(|e| e.error.message)
                    .unwrap_or(text);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let reply: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                reply.usage.input_tokens, reply.usage.output_tokens
            );

            return reply
                .text()
                .map(str::to_owned)
                .ok_or(LlmError::EmptyContent);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the LLM and deserializes the reply as JSON. The prompt must
    /// instruct the model to return a JSON object; code fences and leading
    /// chatter are tolerated.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        params: CallParams,
    ) -> Result<T, LlmError> {
        let text = self.complete(prompt, params).await?;
        let json = extract_json_object(&text).ok_or(LlmError::NoJson)?;
        serde_json::from_str(json).map_err(LlmError::Parse)
    }
}

/// Pulls the first JSON object out of model output. Strips ``` fences if the
/// model wrapped its reply in them, then falls back to the outermost braces.
fn extract_json_object(text: &str) -> Option<&str> {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```json").or_else(|| text.strip_prefix("```")) {
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_plain() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(extract_json_object(input), Some("{\"key\": \"value\"}"));
    }

    #[test]
    fn test_extract_json_object_fenced() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json_object(input), Some("{\"key\": \"value\"}"));
    }

    #[test]
    fn test_extract_json_object_with_leading_chatter() {
        let input = "Here is the structured resume:\n{\"name\": \"Ada\"}";
        assert_eq!(extract_json_object(input), Some("{\"name\": \"Ada\"}"));
    }

    #[test]
    fn test_extract_json_object_none_when_missing() {
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_call_params_default() {
        let params = CallParams::default();
        assert_eq!(params.max_tokens, 1024);
        assert!((params.temperature - 0.7).abs() < f32::EPSILON);
    }
}
