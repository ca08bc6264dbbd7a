//! Anthropic Messages API backend.

mod client;
mod messages;

pub use client::{ANTHROPIC_API_URL, ANTHROPIC_VERSION, AnthropicClient, AnthropicConfig};
pub use messages::{
    ApiErrorDetail, ApiErrorResponse, ContentBlock, MessageParam, MessagesRequest,
    MessagesResponse, Role, Usage,
};
