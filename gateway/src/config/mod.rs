//! Configuration module for the LiveTranslate gateway
//!
//! Server configuration comes from environment variables (a `.env` file is
//! loaded into the environment at startup) and, optionally, a YAML file.
//! Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `env`: Environment variable loading
//! - `yaml`: YAML configuration file loading
//! - `merge`: Applying YAML overrides on top of the environment
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use livetranslate_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::llm::AnthropicConfig;
use crate::core::llm::anthropic::ANTHROPIC_API_URL;
use crate::core::stt::DeepgramSTTConfig;
use crate::core::stt::deepgram::{DEEPGRAM_STT_URL, DEFAULT_DEEPGRAM_LANGUAGE, DEFAULT_DEEPGRAM_MODEL};
use crate::core::translate::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TRANSLATION_MODEL, TranslatorConfig,
};

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "build";
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECONDS: u64 = 10;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse YAML config: {0}")]
    Parse(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidEnv { var: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (bind address, static bundle, shutdown drain)
/// - Deepgram connection settings
/// - Anthropic connection and sampling settings
/// - CORS origins
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// Directory holding the prebuilt frontend bundle
    pub static_dir: PathBuf,
    /// Upper bound on waiting for open sessions at shutdown
    pub shutdown_timeout_seconds: u64,

    // Deepgram
    pub deepgram_api_key: Option<String>,
    pub deepgram_url: String,
    pub deepgram_model: String,
    pub deepgram_language: String,

    // Anthropic
    pub anthropic_api_key: Option<String>,
    pub anthropic_url: String,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    pub anthropic_temperature: f32,

    /// Allowed CORS origins: `None` is same-origin only, `"*"` allows any
    /// origin, otherwise a comma-separated list
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            shutdown_timeout_seconds: DEFAULT_SHUTDOWN_TIMEOUT_SECONDS,
            deepgram_api_key: None,
            deepgram_url: DEEPGRAM_STT_URL.to_string(),
            deepgram_model: DEFAULT_DEEPGRAM_MODEL.to_string(),
            deepgram_language: DEFAULT_DEEPGRAM_LANGUAGE.to_string(),
            anthropic_api_key: None,
            anthropic_url: ANTHROPIC_API_URL.to_string(),
            anthropic_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            anthropic_max_tokens: DEFAULT_MAX_TOKENS,
            anthropic_temperature: DEFAULT_TEMPERATURE,
            cors_allowed_origins: None,
        }
    }
}

/// Zeroize API keys when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.deepgram_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.anthropic_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// The `.env` file is loaded into the process environment in `main`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base.
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// The server address in the format "host:port".
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    /// Deepgram connection settings. A missing key yields an empty key,
    /// which the provider rejects at connection time.
    pub fn deepgram_config(&self) -> DeepgramSTTConfig {
        let mut config =
            DeepgramSTTConfig::new(self.deepgram_api_key.clone().unwrap_or_default());
        config.base_url = self.deepgram_url.clone();
        config.model = self.deepgram_model.clone();
        config.language = self.deepgram_language.clone();
        config
    }

    pub fn anthropic_config(&self) -> AnthropicConfig {
        AnthropicConfig::new(self.anthropic_api_key.clone().unwrap_or_default())
            .with_base_url(self.anthropic_url.clone())
    }

    pub fn translator_config(&self) -> TranslatorConfig {
        TranslatorConfig {
            model: self.anthropic_model.clone(),
            max_tokens: self.anthropic_max_tokens,
            temperature: self.anthropic_temperature,
        }
    }

    /// Names of provider keys that are not configured.
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.deepgram_api_key.is_none() {
            missing.push("DEEPGRAM_API_KEY");
        }
        if self.anthropic_api_key.is_none() {
            missing.push("ANTHROPIC_API_KEY");
        }
        missing
    }
}
