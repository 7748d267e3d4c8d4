//! Price history providers

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::config::{DataProvider, MarketConfig};
use crate::error::Result;
use crate::series::HistoricalSeries;
use std::sync::Arc;

/// Source of daily price history
///
/// Implementations block on network I/O.
#[cfg_attr(test, mockall::automock)]
pub trait MarketData: Send + Sync {
    /// Daily bars from midnight `days_ago` days back until now
    fn history(&self, symbol: &str, days_ago: u32) -> Result<HistoricalSeries>;

    /// Latest close, rounded to cents
    fn latest_close(&self, symbol: &str) -> Result<f64>;
}

/// Accessor for the provider selected in `config`
pub fn data_accessor(config: &MarketConfig) -> Arc<dyn MarketData> {
    match config.provider {
        DataProvider::Yahoo => Arc::new(YahooFinanceClient::new()),
    }
}
