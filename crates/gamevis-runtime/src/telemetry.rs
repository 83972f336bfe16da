//! Tracing subscriber setup

use gamevis_core::{VisError, VisResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            level: "info".to_string(),
            format: LogFormat::Plain,
        }
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed.
pub fn init_tracing(config: &TelemetryConfig) -> VisResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| VisError::Config(format!("bad log level '{}': {}", config.level, e)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = match config.format {
        LogFormat::Plain => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    Ok(installed)
}
