//! Deepgram live streaming Speech-to-Text integration.
//!
//! Each transcription session owns one WebSocket connection to
//! `wss://api.deepgram.com/v1/listen`, configured with:
//!
//! - language and model selection
//! - punctuation and smart formatting
//! - interim results
//! - voice-activity events
//! - a fixed 1000 ms utterance-end timeout
//!
//! # Architecture
//!
//! - [`config`]: `DeepgramSTTConfig` and URL building
//! - [`messages`]: incoming message classification and outgoing control frames
//! - [`client`]: the `DeepgramSTT` connection and the `DeepgramConnector`
//!
//! # Example
//!
//! ```rust,no_run
//! use livetranslate_gateway::core::stt::{
//!     BaseSTT, DeepgramConnector, DeepgramSTTConfig, STTConnector, STTEvent,
//! };
//! use std::future::Future;
//! use std::pin::Pin;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = DeepgramConnector::new(DeepgramSTTConfig::new("your-deepgram-api-key"));
//!
//!     let mut connection = connector
//!         .open(Arc::new(|event: STTEvent| {
//!             Box::pin(async move {
//!                 if let Some(payload) = event.client_payload() {
//!                     println!("{payload}");
//!                 }
//!             }) as Pin<Box<dyn Future<Output = ()> + Send>>
//!         }))
//!         .await?;
//!
//!     connection.send_audio(vec![0u8; 1024].into()).await?;
//!     connection.finish().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod messages;

#[cfg(test)]
mod tests;

pub use client::{DeepgramConnector, DeepgramSTT};
pub use config::{
    DEEPGRAM_STT_URL, DEFAULT_DEEPGRAM_LANGUAGE, DEFAULT_DEEPGRAM_MODEL,
    DEFAULT_KEEPALIVE_INTERVAL, DeepgramSTTConfig, UTTERANCE_END_MS,
};
pub use messages::{
    CloseStreamMessage, DeepgramMessage, ErrorMessage, KeepAliveMessage, MetadataMessage,
    ResultsMessage, SpeechStartedMessage, UtteranceEndMessage, WarningMessage,
};
