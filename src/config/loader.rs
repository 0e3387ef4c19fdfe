//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::FailoverConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, apply environment overrides and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<FailoverConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: FailoverConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay credentials and deployment knobs taken from the environment.
///
/// Runs once at load time; components never consult the environment afterwards.
pub fn apply_env_overrides<F>(config: &mut FailoverConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("CF_API_TOKEN") {
        config.dns.api_token = v;
    }
    if let Some(v) = get("CF_ZONE_ID") {
        config.dns.zone_id = v;
    }
    if let Some(v) = get("CF_RECORD_NAME") {
        config.dns.record_name = v;
    }
    if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
        config.alert.bot_token = v;
    }
    if let Some(v) = get("TELEGRAM_CHAT_ID") {
        config.alert.chat_id = v;
    }
    if let Some(v) = get("FAILURE_THRESHOLD") {
        match v.trim().parse() {
            Ok(threshold) => config.failover.failure_threshold = threshold,
            Err(_) => tracing::warn!(value = %v, "Ignoring invalid FAILURE_THRESHOLD"),
        }
    }
    if let Some(v) = get("PORT") {
        match v.trim().parse::<u16>() {
            Ok(port) => config.status.bind_address = format!("0.0.0.0:{}", port),
            Err(_) => tracing::warn!(value = %v, "Ignoring invalid PORT"),
        }
    }
}
