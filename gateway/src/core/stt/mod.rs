//! Streaming speech-to-text connections.
//!
//! - [`base`]: the `BaseSTT` / `STTConnector` traits and the `STTEvent` enum
//! - [`deepgram`]: Deepgram live streaming implementation

mod base;
pub mod deepgram;

// Re-export public types and traits
pub use base::{BaseSTT, STTConnector, STTError, STTEvent, STTEventCallback};

// Re-export Deepgram implementation
pub use deepgram::{DeepgramConnector, DeepgramSTT, DeepgramSTTConfig};
