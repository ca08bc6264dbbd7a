//! Text translation through an LLM with a shared, bounded conversation history.

mod history;
mod translator;

pub use history::{ConversationHistory, MAX_HISTORY_ENTRIES};
pub use translator::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TRANSLATION_MODEL, RATE_LIMIT_SENTINEL,
    TRANSLATOR_SYSTEM_PROMPT, TranslateError, Translation, Translator, TranslatorConfig,
};
