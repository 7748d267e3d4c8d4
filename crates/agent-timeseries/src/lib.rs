//! Stock market lookups as LLM tools
//!
//! This crate exposes a handful of market helpers to a function-calling
//! agent:
//!
//! - Latest price of a ticker
//! - Percent change over a look-back window
//! - Best performer among several tickers
//! - Simple and exponential moving averages over one or more spans
//!
//! Price history comes from Yahoo Finance through the [`api::MarketData`]
//! accessor. Every lookup that fetches a series also builds a Plotly chart
//! and hands it to a [`chart::ChartSink`].
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_core::Agent;
//! use agent_timeseries::{MarketConfig, TimeSeriesAgent};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MarketConfig::builder().chart_dir("charts").build()?;
//! let agent = TimeSeriesAgent::from_env(&config)?;
//!
//! let answer = agent.run("Which did better over 30 days, AAPL or MSFT?".to_string()).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod metrics;
pub mod series;
pub mod tools;

pub use agent::{TimeSeriesAgent, chart_sink, market_tools};
pub use api::{MarketData, YahooFinanceClient, data_accessor};
pub use config::{DataProvider, MarketConfig};
pub use error::{MarketError, Result};
pub use metrics::EmaWeighting;
pub use series::{Bar, HistoricalSeries};
pub use tools::register_market_tools;
