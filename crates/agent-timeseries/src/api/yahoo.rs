//! Yahoo Finance API client

use crate::api::MarketData;
use crate::error::{MarketError, Result};
use crate::metrics::round2;
use crate::series::{Bar, HistoricalSeries};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::fmt::Display;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
///
/// Uses the blocking connector, so calls must run off the async runtime
/// (the executor runs tools on `spawn_blocking`).
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooFinanceClient;

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| MarketError::YahooFinanceError(e.to_string()))
    }

    /// Get daily bars for a symbol between `start` and `end`
    pub fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HistoricalSeries> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(MarketError::SymbolNotFound {
                symbol: String::new(),
                reason: "empty ticker".to_string(),
            });
        }

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            MarketError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        debug!(symbol, %start, %end, "Fetching quote history");
        let response = Self::connector()?
            .get_quote_history(symbol, start_odt, end_odt)
            .map_err(|e| classify(symbol, e))?;

        let quotes = response.quotes().map_err(|e| classify(symbol, e))?;
        if quotes.is_empty() {
            return Err(MarketError::SymbolNotFound {
                symbol: symbol.to_string(),
                reason: "no bars returned".to_string(),
            });
        }

        Ok(HistoricalSeries::new(
            symbol,
            quotes.iter().map(to_bar).collect(),
        ))
    }
}

impl MarketData for YahooFinanceClient {
    fn history(&self, symbol: &str, days_ago: u32) -> Result<HistoricalSeries> {
        let end = Utc::now();
        self.get_historical_quotes(symbol, window_start(end, days_ago)?, end)
    }

    fn latest_close(&self, symbol: &str) -> Result<f64> {
        let symbol = symbol.trim();
        let response = Self::connector()?
            .get_latest_quotes(symbol, "1d")
            .map_err(|e| classify(symbol, e))?;
        let quote = response.last_quote().map_err(|e| classify(symbol, e))?;

        Ok(round2(quote.close))
    }
}

/// Midnight (UTC) `days_ago` calendar days before `now`
pub(crate) fn window_start(now: DateTime<Utc>, days_ago: u32) -> Result<DateTime<Utc>> {
    let start = now
        .checked_sub_signed(Duration::days(i64::from(days_ago)))
        .ok_or_else(|| {
            MarketError::InvalidWindow(format!("{days_ago} days ago is out of range"))
        })?;
    Ok(start.date_naive().and_time(NaiveTime::MIN).and_utc())
}

fn to_bar(quote: &yahoo::Quote) -> Bar {
    Bar {
        timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0).unwrap_or_else(Utc::now),
        open: quote.open,
        high: quote.high,
        low: quote.low,
        close: quote.close,
        volume: quote.volume,
        adjclose: quote.adjclose,
    }
}

/// Unknown symbols surface as "no data"/"not found" style provider errors
fn classify(symbol: &str, err: impl Display) -> MarketError {
    let reason = err.to_string();
    let lowered = reason.to_lowercase();
    let not_found = ["not found", "no data", "no quotes", "no result", "404", "delisted"]
        .iter()
        .any(|needle| lowered.contains(needle));

    if not_found {
        MarketError::SymbolNotFound {
            symbol: symbol.to_string(),
            reason,
        }
    } else {
        MarketError::YahooFinanceError(format!("{symbol}: {reason}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_start_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 17, 42, 9).unwrap();
        let start = window_start(now, 30).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_start_out_of_range() {
        let result = window_start(Utc::now(), 100_000_000);
        assert!(matches!(result, Err(MarketError::InvalidWindow(_))));
    }

    #[test]
    fn test_classify() {
        let err = classify("ZZZZ", "fetching the data from yahoo! finance failed: 404 Not Found");
        assert!(matches!(err, MarketError::SymbolNotFound { ref symbol, .. } if symbol == "ZZZZ"));

        let err = classify("AAPL", "connection reset by peer");
        assert!(matches!(err, MarketError::YahooFinanceError(msg) if msg.starts_with("AAPL")));
    }

    #[test]
    fn test_empty_symbol_rejected_without_network() {
        let client = YahooFinanceClient::new();
        let result = client.get_historical_quotes("  ", Utc::now(), Utc::now());
        assert!(matches!(result, Err(MarketError::SymbolNotFound { .. })));
    }

    #[test]
    #[ignore] // Requires network access
    fn test_history() {
        let client = YahooFinanceClient::new();
        let series = client.history("AAPL", 30).unwrap();
        assert_eq!(series.symbol(), "AAPL");
        assert!(!series.is_empty());
        assert!(series.last().unwrap().close > 0.0);
    }

    #[test]
    #[ignore] // Requires network access
    fn test_latest_close() {
        let client = YahooFinanceClient::new();
        let price = client.latest_close("MSFT").unwrap();
        assert!(price > 0.0);
        assert_eq!(price, round2(price));
    }

    #[test]
    #[ignore] // Requires network access
    fn test_unknown_symbol() {
        let client = YahooFinanceClient::new();
        let result = client.history("INVALID_SYMBOL_12345", 10);
        assert!(matches!(result, Err(MarketError::SymbolNotFound { .. })));
    }
}
