//! HTTP client adapter for the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use itinero_application::{GenerationCallError, GenerationClient, GenerationPrompt};
use itinero_core::{AppError, AppResult};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const API_VERSION: &str = "2023-06-01";

/// Overall per-call timeout; a timeout surfaces as a retryable failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the Anthropic generation client.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`.
    pub api_key: String,
    /// API base URL, overridable for proxies and tests.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Completion token budget per call.
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Creates a configuration against the public API endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: model.into(),
            max_tokens,
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<MessageBody<'a>>,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// Anthropic implementation of the generation client port.
#[derive(Clone)]
pub struct AnthropicGenerationClient {
    http_client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicGenerationClient {
    /// Creates a client with a request-timeout-bounded HTTP client.
    pub fn new(config: AnthropicConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationClient for AnthropicGenerationClient {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationCallError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: &prompt.system,
            messages: vec![MessageBody {
                role: "user",
                content: &prompt.user,
            }],
        };

        let response = self
            .http_client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    GenerationCallError::Transient("generation request timed out".to_owned())
                } else {
                    GenerationCallError::Transient(
                        "generation request failed to reach the provider".to_owned(),
                    )
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            debug!(status = %status, "generation provider reported throttling");
            return Err(GenerationCallError::Throttled(
                "generation service is overloaded, retry in a few minutes".to_owned(),
            ));
        }

        if !status.is_success() {
            debug!(status = %status, "generation call returned non-success status");
            // Status only: upstream bodies may carry internals that must not
            // reach callers.
            return Err(GenerationCallError::Transient(format!(
                "generation request failed with status {}",
                status.as_u16()
            )));
        }

        let payload: MessagesResponse = response.json().await.map_err(|_| {
            GenerationCallError::Transient(
                "generation response body could not be decoded".to_owned(),
            )
        })?;

        extract_text(payload)
    }
}

fn extract_text(response: MessagesResponse) -> Result<String, GenerationCallError> {
    response
        .content
        .into_iter()
        .find(|block| block.block_type == "text")
        .map(|block| block.text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            GenerationCallError::Transient(
                "generation response contained no text content".to_owned(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::{AnthropicConfig, AnthropicGenerationClient, MessagesResponse, extract_text};

    #[test]
    fn text_block_is_extracted() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "{\"destination\": \"Lisbonne\"}"}]}"#,
        )
        .unwrap_or_else(|_| panic!("test"));

        let text = extract_text(response).unwrap_or_else(|_| panic!("test"));
        assert_eq!(text, "{\"destination\": \"Lisbonne\"}");
    }

    #[test]
    fn first_text_block_wins_over_later_blocks() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content": [
                {"type": "tool_use"},
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ]}"#,
        )
        .unwrap_or_else(|_| panic!("test"));

        let text = extract_text(response).unwrap_or_else(|_| panic!("test"));
        assert_eq!(text, "first");
    }

    #[test]
    fn response_without_text_is_a_transient_failure() {
        let response: MessagesResponse =
            serde_json::from_str(r#"{"content": [{"type": "tool_use"}]}"#)
                .unwrap_or_else(|_| panic!("test"));

        assert!(extract_text(response).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let config = AnthropicConfig::new("key", "model", 4096)
            .with_base_url("https://proxy.internal/anthropic/");
        let client = AnthropicGenerationClient::new(config).unwrap_or_else(|_| panic!("test"));

        assert_eq!(
            client.messages_url(),
            "https://proxy.internal/anthropic/messages"
        );
    }
}
