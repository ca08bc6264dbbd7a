use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ServerConfig};

/// Read a variable, treating an empty value as unset.
pub(super) fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Read and parse a variable.
pub(super) fn parse_env<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnv {
                var: name.to_string(),
                message: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}

/// Build a configuration from the process environment, with defaults for unset values.
pub(super) fn load_from_env() -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_env("PORT")? {
        config.port = port;
    }
    if let Some(dir) = env_var("STATIC_DIR") {
        config.static_dir = PathBuf::from(dir);
    }
    if let Some(seconds) = parse_env("SHUTDOWN_TIMEOUT_SECONDS")? {
        config.shutdown_timeout_seconds = seconds;
    }
    config.cors_allowed_origins = env_var("CORS_ALLOWED_ORIGINS");

    config.deepgram_api_key = env_var("DEEPGRAM_API_KEY");
    if let Some(url) = env_var("DEEPGRAM_URL") {
        config.deepgram_url = url;
    }
    if let Some(model) = env_var("DEEPGRAM_MODEL") {
        config.deepgram_model = model;
    }
    if let Some(language) = env_var("DEEPGRAM_LANGUAGE") {
        config.deepgram_language = language;
    }

    config.anthropic_api_key = env_var("ANTHROPIC_API_KEY");
    if let Some(url) = env_var("ANTHROPIC_URL") {
        config.anthropic_url = url;
    }
    if let Some(model) = env_var("ANTHROPIC_MODEL") {
        config.anthropic_model = model;
    }
    if let Some(max_tokens) = parse_env("ANTHROPIC_MAX_TOKENS")? {
        config.anthropic_max_tokens = max_tokens;
    }
    if let Some(temperature) = parse_env("ANTHROPIC_TEMPERATURE")? {
        config.anthropic_temperature = temperature;
    }

    Ok(config)
}
