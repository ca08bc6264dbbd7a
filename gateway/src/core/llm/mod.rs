//! Chat-completion backends used by the translator.

pub mod anthropic;
mod base;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use base::{ChatCompletion, LLMError};
