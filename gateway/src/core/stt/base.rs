//! Base traits and types for streaming speech-to-text connections.
//!
//! A speech-service connection is a live channel to the transcription provider
//! for one client session. Provider events are delivered as a closed set of
//! [`STTEvent`] variants through a single callback, so the relay matches on
//! the variant instead of registering one handler per event name.

use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur on a speech-service connection.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum STTError {
    /// Connection to the provider could not be established or is gone
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Provider rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Transport-level failure while the connection was open
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider reported an error in-band
    #[error("Provider error: {0}")]
    ProviderError(String),
}

// =============================================================================
// Events
// =============================================================================

/// Events emitted by a speech-service connection.
///
/// `Transcript`, `Metadata` and `UtteranceEnd` carry the provider's raw JSON
/// payload, which is forwarded to the client without reshaping.
#[derive(Debug, Clone, PartialEq)]
pub enum STTEvent {
    /// The connection is open and accepting audio
    Open,
    /// Interim or final transcription result
    Transcript(String),
    /// Stream metadata (request id, model info, durations)
    Metadata(String),
    /// Pause boundary detected in speech
    UtteranceEnd(String),
    /// Non-fatal provider warning
    Warning(String),
    /// Provider or transport error
    Error(STTError),
    /// The connection has closed
    Close,
}

impl STTEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            STTEvent::Open => "open",
            STTEvent::Transcript(_) => "transcript",
            STTEvent::Metadata(_) => "metadata",
            STTEvent::UtteranceEnd(_) => "utterance end",
            STTEvent::Warning(_) => "warning",
            STTEvent::Error(_) => "error",
            STTEvent::Close => "close",
        }
    }

    /// Payload that should reach the client, if this event is forwarded.
    pub fn client_payload(&self) -> Option<&str> {
        match self {
            STTEvent::Transcript(payload)
            | STTEvent::Metadata(payload)
            | STTEvent::UtteranceEnd(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Async callback receiving every event of a connection, in order.
pub type STTEventCallback =
    Arc<dyn Fn(STTEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

// =============================================================================
// Traits
// =============================================================================

/// A single live connection to a streaming speech-to-text provider.
#[async_trait]
pub trait BaseSTT: Send + Sync {
    /// Establish the connection. Emits [`STTEvent::Open`] on success.
    async fn connect(&mut self) -> Result<(), STTError>;

    /// Whether the connection is currently able to accept audio.
    fn is_ready(&self) -> bool;

    /// Forward one chunk of audio to the provider.
    async fn send_audio(&mut self, audio_data: Bytes) -> Result<(), STTError>;

    /// Close the connection gracefully and release its tasks.
    async fn finish(&mut self) -> Result<(), STTError>;

    /// Human-readable provider name.
    fn get_provider_info(&self) -> &'static str;
}

/// Opens fresh speech-service connections for transcription sessions.
#[async_trait]
pub trait STTConnector: Send + Sync {
    /// Open a new connection whose events are delivered to `on_event`.
    async fn open(&self, on_event: STTEventCallback) -> Result<Box<dyn BaseSTT>, STTError>;
}
