//! Logging setup for hosts embedding Tessera.
//!
//! The library crates only emit `tracing` events; installing a subscriber is
//! the host's call. This crate provides the standard one: an [`EnvFilter`]
//! taken from `RUST_LOG` when set and valid, otherwise from [`LogConfig`],
//! feeding a `fmt` layer on stderr.
//!
//! ```no_run
//! let config = tessera_telemetry::LogConfig::default();
//! tessera_telemetry::init_logging(&config);
//! tracing::info!("editor ready");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info";

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

/// `[log]` section of the editor config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `tessera_license=debug,info`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl LogConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self { filter: filter.into() }
    }
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter {directive:?}: {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Pick the filter: a valid `env_directive` wins, else the configured one.
pub fn build_filter(config: &LogConfig, env_directive: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = env_directive.and_then(|d| EnvFilter::try_new(d).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| TelemetryError::InvalidFilter {
        directive: config.filter.clone(),
        reason: e.to_string(),
    })
}

fn env_directive() -> Option<String> {
    std::env::var(EnvFilter::DEFAULT_ENV).ok()
}

/// Install the global subscriber, or report why it could not be.
pub fn try_init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config, env_directive().as_deref())?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}

/// Install the global subscriber.
///
/// Panics if one is already installed. An invalid configured filter falls
/// back to [`DEFAULT_FILTER`].
pub fn init_logging(config: &LogConfig) {
    let filter = build_filter(config, env_directive().as_deref())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
