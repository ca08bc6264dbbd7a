//! HTTP client for the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use zeroize::Zeroize;

use super::messages::{ApiErrorResponse, MessagesRequest, MessagesResponse};
use crate::core::llm::base::{ChatCompletion, LLMError};

/// Default API base URL.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("livetranslate-gateway/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`AnthropicClient`].
#[derive(Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    /// Base URL without the `/v1/messages` path
    pub base_url: String,
    pub timeout: Duration,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of the messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Drop for AnthropicConfig {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

/// Anthropic Messages API backend.
pub struct AnthropicClient {
    config: AnthropicConfig,
    http_client: Client,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self, LLMError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                LLMError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Map a non-success status and body to an [`LLMError`].
pub(crate) fn classify_error(status: u16, body: &str) -> LLMError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => format!("{} ({})", parsed.error.message, parsed.error.error_type),
        Err(_) => body.to_string(),
    };

    match status {
        429 => LLMError::RateLimited(message),
        401 | 403 => LLMError::AuthenticationFailed(message),
        _ => LLMError::ApiError { status, message },
    }
}

#[async_trait]
impl ChatCompletion for AnthropicClient {
    async fn create_message(
        &self,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, LLMError> {
        if self.config.api_key.is_empty() {
            return Err(LLMError::AuthenticationFailed(
                "Anthropic API key is not configured".to_string(),
            ));
        }

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending Anthropic messages request"
        );

        let response = self
            .http_client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        let request_id = response
            .headers()
            .get("request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .text()
            .await
            .map_err(|e| LLMError::NetworkError(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let error = classify_error(status.as_u16(), &body);
            warn!(
                status = status.as_u16(),
                request_id = request_id.as_deref().unwrap_or("-"),
                "Anthropic request failed: {}",
                error
            );
            return Err(error);
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Anthropic reply received"
        );

        Ok(parsed)
    }
}
