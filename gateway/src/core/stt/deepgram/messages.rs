//! WebSocket message types for the Deepgram live streaming API.
//!
//! - **Incoming messages** are classified by their `type` field:
//!   - `Results`: interim or final transcript
//!   - `Metadata`: stream summary, sent when the stream closes
//!   - `UtteranceEnd`: pause boundary after the last finalized word
//!   - `SpeechStarted`: voice activity detected
//!   - `Error` / `Warning`: in-band provider notices
//!
//! - **Outgoing messages**:
//!   - Binary audio data (sent directly, no JSON wrapper)
//!   - [`KeepAliveMessage`]: keeps an idle stream open
//!   - [`CloseStreamMessage`]: flush pending results and close

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Incoming Messages (Server to Client)
// =============================================================================

/// One transcription hypothesis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Channel section of a `Results` message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsChannel {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// Transcription result.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsMessage {
    /// Whether this result is final for its audio segment
    #[serde(default)]
    pub is_final: bool,
    /// Whether an endpoint was detected after this result
    #[serde(default)]
    pub speech_final: bool,
    /// Segment start in seconds
    #[serde(default)]
    pub start: f64,
    /// Segment duration in seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub channel: ResultsChannel,
}

impl ResultsMessage {
    /// Best transcript for this segment, empty if the provider sent none.
    pub fn transcript(&self) -> &str {
        self.channel
            .alternatives
            .first()
            .map(|alt| alt.transcript.as_str())
            .unwrap_or("")
    }
}

/// Stream metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataMessage {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub channels: u32,
}

/// Utterance boundary notice.
#[derive(Debug, Clone, Deserialize)]
pub struct UtteranceEndMessage {
    #[serde(default)]
    pub channel: Vec<u32>,
    #[serde(default)]
    pub last_word_end: f64,
}

/// Voice activity notice.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechStartedMessage {
    #[serde(default)]
    pub channel: Vec<u32>,
    #[serde(default)]
    pub timestamp: f64,
}

/// In-band error notice.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub variant: String,
}

impl ErrorMessage {
    /// The most specific text the provider gave.
    pub fn text(&self) -> &str {
        if !self.description.is_empty() {
            &self.description
        } else {
            &self.message
        }
    }
}

/// In-band warning notice.
#[derive(Debug, Clone, Deserialize)]
pub struct WarningMessage {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub variant: String,
}

/// A classified message received from Deepgram.
#[derive(Debug, Clone)]
pub enum DeepgramMessage {
    Results(ResultsMessage),
    Metadata(MetadataMessage),
    UtteranceEnd(UtteranceEndMessage),
    SpeechStarted(SpeechStartedMessage),
    Error(ErrorMessage),
    Warning(WarningMessage),
    /// Any message type this gateway does not know about
    Unknown(String),
}

impl DeepgramMessage {
    /// The `type` field of a text frame, or `None` when the frame is not a
    /// JSON object carrying one.
    pub fn message_type(text: &str) -> Option<String> {
        let value: Value = serde_json::from_str(text).ok()?;
        value.get("type").and_then(Value::as_str).map(str::to_owned)
    }

    /// Parse a text frame from Deepgram.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        let message_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(match message_type.as_str() {
            "Results" => Self::Results(serde_json::from_value(value)?),
            "Metadata" => Self::Metadata(serde_json::from_value(value)?),
            "UtteranceEnd" => Self::UtteranceEnd(serde_json::from_value(value)?),
            "SpeechStarted" => Self::SpeechStarted(serde_json::from_value(value)?),
            "Error" => Self::Error(serde_json::from_value(value)?),
            "Warning" => Self::Warning(serde_json::from_value(value)?),
            _ => Self::Unknown(message_type),
        })
    }
}

// =============================================================================
// Outgoing Messages (Client to Server)
// =============================================================================

/// Keeps the stream open while no audio is being sent.
#[derive(Debug, Clone, Serialize)]
pub struct KeepAliveMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
}

impl Default for KeepAliveMessage {
    fn default() -> Self {
        Self {
            message_type: "KeepAlive",
        }
    }
}

/// Asks Deepgram to flush pending results and close the stream.
#[derive(Debug, Clone, Serialize)]
pub struct CloseStreamMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
}

impl Default for CloseStreamMessage {
    fn default() -> Self {
        Self {
            message_type: "CloseStream",
        }
    }
}
