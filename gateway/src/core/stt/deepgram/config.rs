//! Configuration for the Deepgram live streaming API.

use std::time::Duration;

use url::Url;
use zeroize::Zeroize;

use crate::core::stt::base::STTError;

/// Deepgram live transcription endpoint
pub const DEEPGRAM_STT_URL: &str = "wss://api.deepgram.com/v1/listen";

/// Default Deepgram model
pub const DEFAULT_DEEPGRAM_MODEL: &str = "nova-2";

/// Default transcription language
pub const DEFAULT_DEEPGRAM_LANGUAGE: &str = "en";

/// Silence (ms) after the last finalized word before an `UtteranceEnd` is sent.
pub const UTTERANCE_END_MS: u32 = 1000;

/// Interval between `KeepAlive` messages while a connection is open.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration specific to the Deepgram live streaming API.
#[derive(Clone)]
pub struct DeepgramSTTConfig {
    /// Deepgram API key, sent as `Authorization: Token <key>`
    pub api_key: String,

    /// WebSocket endpoint, overridable for self-hosted deployments and tests
    pub base_url: String,

    /// Model name (e.g. "nova-2")
    pub model: String,

    /// BCP-47 language tag
    pub language: String,

    /// Add punctuation and capitalization
    pub punctuate: bool,

    /// Apply smart formatting (dates, numbers, currency)
    pub smart_format: bool,

    /// Stream interim results while the speaker is still talking
    pub interim_results: bool,

    /// Emit `SpeechStarted` voice-activity events
    pub vad_events: bool,

    /// How often to send `KeepAlive` while no audio is flowing
    pub keepalive_interval: Duration,
}

impl Default for DeepgramSTTConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEEPGRAM_STT_URL.to_string(),
            model: DEFAULT_DEEPGRAM_MODEL.to_string(),
            language: DEFAULT_DEEPGRAM_LANGUAGE.to_string(),
            punctuate: true,
            smart_format: true,
            interim_results: true,
            vad_events: true,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
        }
    }
}

impl DeepgramSTTConfig {
    /// Create a configuration with the default live options and the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api_key = api_key.into();
        config
    }

    /// Build the WebSocket URL with all live options as query parameters.
    pub fn build_websocket_url(&self) -> Result<Url, STTError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            STTError::ConfigurationError(format!("Invalid Deepgram URL '{}': {e}", self.base_url))
        })?;

        url.query_pairs_mut()
            .append_pair("model", &self.model)
            .append_pair("language", &self.language)
            .append_pair("punctuate", bool_param(self.punctuate))
            .append_pair("smart_format", bool_param(self.smart_format))
            .append_pair("interim_results", bool_param(self.interim_results))
            .append_pair("vad_events", bool_param(self.vad_events))
            .append_pair("utterance_end_ms", &UTTERANCE_END_MS.to_string());

        Ok(url)
    }
}

impl std::fmt::Debug for DeepgramSTTConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepgramSTTConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("language", &self.language)
            .field("punctuate", &self.punctuate)
            .field("smart_format", &self.smart_format)
            .field("interim_results", &self.interim_results)
            .field("vad_events", &self.vad_events)
            .field("keepalive_interval", &self.keepalive_interval)
            .finish()
    }
}

impl Drop for DeepgramSTTConfig {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

#[inline]
fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
