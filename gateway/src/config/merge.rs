use std::path::PathBuf;

use super::env::load_from_env;
use super::yaml::YamlConfig;
use super::{ConfigError, ServerConfig};

/// Environment configuration with YAML values laid over it.
pub(super) fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, ConfigError> {
    let mut config = load_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(dir) = server.static_dir {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(seconds) = server.shutdown_timeout_seconds {
            config.shutdown_timeout_seconds = seconds;
        }
    }

    if let Some(providers) = yaml.providers {
        if providers.deepgram_api_key.is_some() {
            config.deepgram_api_key = providers.deepgram_api_key;
        }
        if providers.anthropic_api_key.is_some() {
            config.anthropic_api_key = providers.anthropic_api_key;
        }
    }

    if let Some(deepgram) = yaml.deepgram {
        if let Some(url) = deepgram.url {
            config.deepgram_url = url;
        }
        if let Some(model) = deepgram.model {
            config.deepgram_model = model;
        }
        if let Some(language) = deepgram.language {
            config.deepgram_language = language;
        }
    }

    if let Some(anthropic) = yaml.anthropic {
        if let Some(url) = anthropic.url {
            config.anthropic_url = url;
        }
        if let Some(model) = anthropic.model {
            config.anthropic_model = model;
        }
        if let Some(max_tokens) = anthropic.max_tokens {
            config.anthropic_max_tokens = max_tokens;
        }
        if let Some(temperature) = anthropic.temperature {
            config.anthropic_temperature = temperature;
        }
    }

    if let Some(security) = yaml.security
        && security.cors_allowed_origins.is_some()
    {
        config.cors_allowed_origins = security.cors_allowed_origins;
    }

    Ok(config)
}
