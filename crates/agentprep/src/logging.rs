//! Subscriber setup for `tracing`, with `log` records bridged in.

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::AgentPrepError;

static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();

/// Installs the global subscriber. `RUST_LOG`, when set, wins over
/// `config.level`.
///
/// Only the first call does any work; later calls return its outcome.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AgentPrepError> {
    INSTALLED
        .get_or_init(|| install(config))
        .clone()
        .map_err(AgentPrepError::Logging)
}

fn install(config: &LoggingConfig) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| format!("invalid filter '{}': {}", config.level, e))?;

    tracing_log::LogTracer::init().map_err(|e| format!("log bridge: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer()))
    };
    installed.map_err(|e| e.to_string())?;

    tracing::debug!(json = config.json, "Logging initialised");
    Ok(())
}
