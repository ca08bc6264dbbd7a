pub mod llm;
pub mod relay;
pub mod stt;
pub mod translate;

// Re-export commonly used types for convenience
pub use stt::{
    BaseSTT, DeepgramConnector, DeepgramSTT, DeepgramSTTConfig, STTConnector, STTError, STTEvent,
    STTEventCallback,
};

pub use llm::{AnthropicClient, AnthropicConfig, ChatCompletion, LLMError};

pub use relay::{ClientChannel, ClientFrame, ForwardOutcome, TranscriptionSession};

pub use translate::{
    ConversationHistory, MAX_HISTORY_ENTRIES, RATE_LIMIT_SENTINEL, TranslateError, Translation,
    Translator, TranslatorConfig,
};
