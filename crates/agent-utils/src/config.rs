//! Configuration management utilities

use crate::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable selecting the log output format
pub const LOG_FORMAT_ENV: &str = "TIMESERIES_LOG_FORMAT";

/// Default filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "warn,agent_timeseries=info,agent_runtime=info";

/// Errors raised while reading process settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Process-level settings shared by every binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name, used as the title shown to the user
    pub app_name: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Filter applied when `RUST_LOG` is absent
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Time Series Agent".to_string(),
            log_format: LogFormat::Pretty,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(LOG_FORMAT_ENV) {
            config.log_format = raw.parse().map_err(|reason| ConfigError::InvalidValue {
                key: LOG_FORMAT_ENV.to_string(),
                reason,
            })?;
        }
        Ok(config)
    }
}

/// Load a `.env` file from the working directory or its parents
///
/// Variables already present in the environment are not overridden.
/// Returns the path of the file that was loaded, if any.
pub fn load_env_file() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded environment file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load environment file");
            None
        }
    }
}
