//! Shared utilities for the time series agent
//!
//! Logging setup, `.env` loading and the process-level settings every
//! binary in the workspace reads at startup.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, load_env_file};
pub use logging::{LogFormat, init_tracing_with};
