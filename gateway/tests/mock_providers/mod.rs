//! Mock provider servers
//!
//! - WebSocket: an in-process Deepgram live endpoint
//! - HTTP: wiremock helpers for the Anthropic Messages API
//!
//! Plus a helper building a [`ServerConfig`] pointed at the mocks.

// Not every test binary uses every helper
#![allow(dead_code)]

pub mod http_mock;
pub mod websocket_mock;

use std::path::PathBuf;

use livetranslate_gateway::ServerConfig;

/// Configuration pointing both providers at local mocks.
pub fn test_config(deepgram_url: &str, anthropic_url: &str) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.static_dir = PathBuf::from("tests/fixtures/build");
    config.shutdown_timeout_seconds = 2;
    config.deepgram_api_key = Some("test_deepgram_key".to_string());
    config.deepgram_url = deepgram_url.to_string();
    config.anthropic_api_key = Some("test_anthropic_key".to_string());
    config.anthropic_url = anthropic_url.to_string();
    config
}
