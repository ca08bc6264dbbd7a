use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::history::ConversationHistory;
use crate::core::llm::anthropic::{MessageParam, MessagesRequest};
use crate::core::llm::{ChatCompletion, LLMError};

/// Text returned in place of a translation when the provider quota is exhausted.
pub const RATE_LIMIT_SENTINEL: &str = "(Error: Rate Limit)";

pub const DEFAULT_TRANSLATION_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

pub const TRANSLATOR_SYSTEM_PROMPT: &str = "You are a highly skilled translator with expertise in many languages. Your task is to identify the language of the text I provide and accurately translate it into the specified target language while preserving the meaning, tone, and nuance of the original text. Please maintain proper grammar, spelling, and punctuation in the translated version. Please only output the translated text without any extra annotations, metadata, or preambles.";

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_TRANSLATION_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Outcome of a translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    /// The provider quota is exhausted; nothing was recorded.
    RateLimited,
}

impl Translation {
    /// Text sent back to the client.
    pub fn text(&self) -> &str {
        match self {
            Translation::Translated(text) => text,
            Translation::RateLimited => RATE_LIMIT_SENTINEL,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Translation::RateLimited)
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Provider(#[from] LLMError),

    #[error("Reply contained no text")]
    EmptyResponse,
}

/// Forwards text to an LLM and records each exchange in a shared history.
pub struct Translator {
    llm: Arc<dyn ChatCompletion>,
    config: TranslatorConfig,
    history: Mutex<ConversationHistory>,
}

impl Translator {
    pub fn new(llm: Arc<dyn ChatCompletion>, config: TranslatorConfig) -> Self {
        Self::with_history(llm, config, ConversationHistory::new())
    }

    pub fn with_history(
        llm: Arc<dyn ChatCompletion>,
        config: TranslatorConfig,
        history: ConversationHistory,
    ) -> Self {
        Self {
            llm,
            config,
            history: Mutex::new(history),
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn history_snapshot(&self) -> Vec<MessageParam> {
        self.history.lock().snapshot()
    }

    /// Translate `text` into `language`.
    ///
    /// The history is only modified when a text reply was received.
    pub async fn translate(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Translation, TranslateError> {
        let user_turn = MessageParam::user_text(format!("{text} --> {language}"));

        let mut messages = self.history.lock().snapshot();
        messages.push(user_turn.clone());

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(TRANSLATOR_SYSTEM_PROMPT.to_string()),
            messages,
        };

        let response = match self.llm.create_message(&request).await {
            Ok(response) => response,
            Err(LLMError::RateLimited(message)) => {
                warn!("Translation rate limited: {}", message);
                return Ok(Translation::RateLimited);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(translated) = response.first_text().map(str::to_owned) else {
            return Err(TranslateError::EmptyResponse);
        };

        let entries = {
            let mut history = self.history.lock();
            history.append_exchange(user_turn, response.to_message_param());
            history.len()
        };
        debug!(language, history_entries = entries, "Translation recorded");

        Ok(Translation::Translated(translated))
    }
}
