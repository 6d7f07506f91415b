use std::path::{Path, PathBuf};

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub const ENV_REMOTE_URL: &str = "AGENTPREP_REMOTE_URL";
pub const ENV_STORE_PATH: &str = "AGENTPREP_STORE_PATH";
pub const ENV_LOG_LEVEL: &str = "AGENTPREP_LOG_LEVEL";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

/// Parses, schema-checks, applies environment overrides, then validates.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let mut config: Config = serde_json::from_value(json_value)?;
    apply_env_overrides(&mut config);

    validate_config(&config)?;

    Ok(config)
}

/// Overrides file settings with non-empty `AGENTPREP_*` variables.
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(url) = env_value(ENV_REMOTE_URL) {
        log::debug!("{} overrides remote.base_url", ENV_REMOTE_URL);
        config.remote.base_url = url;
    }
    if let Some(path) = env_value(ENV_STORE_PATH) {
        log::debug!("{} overrides store.path", ENV_STORE_PATH);
        config.store.path = Some(PathBuf::from(path));
    }
    if let Some(level) = env_value(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let url = &config.remote.base_url;
    if config.remote.enabled && !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            message: format!("remote.base_url must be an http(s) URL, got '{}'", url),
        });
    }

    if config.remote.connect_timeout_secs == 0 || config.remote.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "remote timeouts must be at least one second".to_string(),
        });
    }

    if config.store.key.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "store.key must not be empty".to_string(),
        });
    }

    if let Err(e) = tracing_subscriber::EnvFilter::try_new(&config.logging.level) {
        return Err(ConfigError::Validation {
            message: format!("Invalid logging.level '{}': {}", config.logging.level, e),
        });
    }

    Ok(())
}
