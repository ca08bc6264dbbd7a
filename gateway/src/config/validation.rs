use super::{ConfigError, ServerConfig};

/// Reject configurations the server cannot run with.
///
/// Missing API keys are not an error here; `main` logs a warning for them.
pub(super) fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.port == 0 {
        return Err(ConfigError::Invalid("port must be non-zero".to_string()));
    }

    if config.static_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "static_dir must not be empty".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.anthropic_temperature) {
        return Err(ConfigError::Invalid(format!(
            "anthropic temperature must be between 0 and 1, got {}",
            config.anthropic_temperature
        )));
    }

    if config.anthropic_max_tokens == 0 {
        return Err(ConfigError::Invalid(
            "anthropic max_tokens must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
