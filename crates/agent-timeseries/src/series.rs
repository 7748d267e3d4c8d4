//! Historical price series

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// Bars for one symbol, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl HistoricalSeries {
    /// Create a series; bars are sorted by timestamp
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in time order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Bar timestamps in time order
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|bar| bar.timestamp).collect()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

/// Series of consecutive daily bars built from close prices
#[cfg(test)]
pub(crate) fn daily_series(symbol: &str, closes: &[f64]) -> HistoricalSeries {
    use chrono::{Duration, TimeZone};

    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
            adjclose: close,
        })
        .collect();
    HistoricalSeries::new(symbol, bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bars_are_sorted() {
        let mut bars = daily_series("AAPL", &[1.0, 2.0, 3.0]).bars().to_vec();
        bars.reverse();

        let series = HistoricalSeries::new("AAPL", bars);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first().unwrap().close, 1.0);
        assert_eq!(series.last().unwrap().close, 3.0);
        assert_eq!(series.symbol(), "AAPL");
    }

    #[test]
    fn test_empty_series() {
        let series = HistoricalSeries::new("AAPL", Vec::new());
        assert!(series.is_empty());
        assert!(series.first().is_none());
    }
}
