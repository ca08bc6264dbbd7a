//! Base trait and error type for LLM chat backends.

use async_trait::async_trait;
use thiserror::Error;

use super::anthropic::{MessagesRequest, MessagesResponse};

/// Errors returned by an LLM backend.
#[derive(Debug, Error)]
pub enum LLMError {
    /// The provider reports exhausted quota (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Transport failure
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// A backend able to complete a conversation.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn create_message(&self, request: &MessagesRequest)
    -> Result<MessagesResponse, LLMError>;
}
