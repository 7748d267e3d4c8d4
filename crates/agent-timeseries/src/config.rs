//! Configuration for the time series agent

use crate::error::{MarketError, Result};
use crate::metrics::EmaWeighting;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the chart output directory
pub const CHART_DIR_ENV: &str = "TIMESERIES_CHART_DIR";

/// Environment variable overriding the chat model
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// Environment variable selecting the EMA weighting (`adjusted`, `recursive`)
pub const EMA_WEIGHTING_ENV: &str = "TIMESERIES_EMA_WEIGHTING";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";

/// Data provider for price history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataProvider {
    /// Yahoo Finance (no API key required)
    #[default]
    Yahoo,
}

/// Configuration for market lookups and the agent built on them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Where price history comes from
    pub provider: DataProvider,

    /// Directory for HTML charts; `None` disables chart output
    pub chart_dir: Option<PathBuf>,

    /// Chat model used by the agent
    pub model: String,

    /// Sampling temperature used by the agent
    pub temperature: f32,

    /// Maximum LLM round trips per query
    pub max_iterations: usize,

    /// Weighting used by the exponential moving average tool
    #[serde(default)]
    pub ema_weighting: EmaWeighting,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::Yahoo,
            chart_dir: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_iterations: 10,
            ema_weighting: EmaWeighting::Adjusted,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(MarketError::ConfigError("model must not be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(MarketError::ConfigError(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }

        if self.max_iterations == 0 {
            return Err(MarketError::ConfigError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if let Some(dir) = self.chart_dir.as_deref().filter(|dir| dir.is_file()) {
            return Err(MarketError::ConfigError(format!(
                "chart directory {} is a file",
                dir.display()
            )));
        }

        Ok(())
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    provider: Option<DataProvider>,
    chart_dir: Option<PathBuf>,
    model: Option<String>,
    temperature: Option<f32>,
    max_iterations: Option<usize>,
    ema_weighting: Option<EmaWeighting>,
    ema_weighting_env: Option<String>,
}

impl MarketConfigBuilder {
    /// Set the data provider
    pub fn provider(mut self, provider: DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Write HTML charts into `dir`
    pub fn chart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(dir.into());
        self
    }

    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the iteration cap
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set the EMA weighting
    pub fn ema_weighting(mut self, weighting: EmaWeighting) -> Self {
        self.ema_weighting = Some(weighting);
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from `lookup`
    ///
    /// Reads `TIMESERIES_CHART_DIR`, `OPENAI_MODEL` and `TIMESERIES_EMA_WEIGHTING`;
    /// a bad weighting is reported by [`build`](Self::build).
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if self.chart_dir.is_none() {
            self.chart_dir = non_empty(CHART_DIR_ENV).map(PathBuf::from);
        }
        if self.model.is_none() {
            self.model = non_empty(MODEL_ENV);
        }
        if self.ema_weighting.is_none() {
            self.ema_weighting_env = non_empty(EMA_WEIGHTING_ENV);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();
        let ema_weighting = match (self.ema_weighting, self.ema_weighting_env) {
            (Some(weighting), _) => weighting,
            (None, Some(raw)) => raw
                .parse()
                .map_err(|e: String| MarketError::ConfigError(format!("{EMA_WEIGHTING_ENV}: {e}")))?,
            (None, None) => defaults.ema_weighting,
        };

        let config = MarketConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            chart_dir: self.chart_dir,
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            ema_weighting,
        };

        config.validate()?;
        Ok(config)
    }
}
