//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `transcription` - Browser audio relay to the speech service
//! - `translate` - Text translation REST API

pub mod api;
pub mod transcription;
pub mod translate;

pub use transcription::transcription_handler;
pub use translate::translate_handler;
