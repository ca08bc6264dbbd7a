use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::llm::{AnthropicClient, ChatCompletion};
use crate::core::stt::{DeepgramConnector, STTConnector};
use crate::core::translate::Translator;
use crate::errors::AppResult;
use crate::shutdown::ShutdownCoordinator;

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    /// Owns the shared translation history
    pub translator: Translator,
    /// Opens one speech-service connection per transcription session
    pub stt_connector: Arc<dyn STTConnector>,
    pub shutdown: ShutdownCoordinator,
}

impl AppState {
    /// Build state wired to Deepgram and Anthropic from `config`.
    pub fn new(config: ServerConfig) -> AppResult<Arc<Self>> {
        let llm: Arc<dyn ChatCompletion> = Arc::new(AnthropicClient::new(config.anthropic_config())?);
        let stt_connector: Arc<dyn STTConnector> =
            Arc::new(DeepgramConnector::new(config.deepgram_config()));

        Ok(Self::with_components(config, llm, stt_connector))
    }

    /// Build state around the given backends.
    pub fn with_components(
        config: ServerConfig,
        llm: Arc<dyn ChatCompletion>,
        stt_connector: Arc<dyn STTConnector>,
    ) -> Arc<Self> {
        let translator = Translator::new(llm, config.translator_config());
        Arc::new(Self {
            config,
            translator,
            stt_connector,
            shutdown: ShutdownCoordinator::new(),
        })
    }
}
