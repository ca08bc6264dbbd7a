//! Transcription relay between a client WebSocket and the speech service.
//!
//! A [`TranscriptionSession`] owns the speech-service connection for one
//! client. Audio goes out through [`TranscriptionSession::forward_audio`];
//! provider events come back through [`dispatch_event`] and are queued on the
//! client's [`ClientChannel`].

mod client;
mod session;

pub use client::{ClientChannel, ClientFrame, ClientFrames};
pub use session::{ForwardOutcome, TranscriptionSession, dispatch_event};
