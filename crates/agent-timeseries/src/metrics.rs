//! Price metrics over historical series
//!
//! Everything here is a pure computation over close prices, except
//! [`best_performer`] which fetches through a [`MarketData`] accessor.

use crate::api::MarketData;
use crate::error::{MarketError, Result};
use crate::series::HistoricalSeries;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};
use tracing::{debug, warn};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn change_percent(old: f64, new: f64) -> f64 {
    round2(raw_change_percent(old, new))
}

fn raw_change_percent(old: f64, new: f64) -> f64 {
    (new - old) / old * 100.0
}

fn raw_percent_change(series: &HistoricalSeries) -> Result<f64> {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => Ok(raw_change_percent(first.close, last.close)),
        _ => Err(MarketError::EmptySeries(series.symbol().to_string())),
    }
}

/// Percent change from the first to the last close, rounded to 2 decimals
///
/// A single bar yields `0.0`. A zero first close is not special-cased.
pub fn percent_change(series: &HistoricalSeries) -> Result<f64> {
    raw_percent_change(series).map(round2)
}

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(MarketError::InvalidWindow(
            "moving average span must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Trailing mean over `window` closes
///
/// The output is aligned with `closes`; the first `window - 1` entries are
/// `None`.
pub fn simple_moving_average(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window)?;
    if window > closes.len() {
        return Ok(vec![None; closes.len()]);
    }
    let mut sma = SimpleMovingAverage::new(window)
        .map_err(|e| MarketError::IndicatorError(e.to_string()))?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = sma.next(close);
            (i + 1 >= window).then_some(value)
        })
        .collect())
}

/// How past samples are weighted in an exponential moving average
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaWeighting {
    /// Normalised weights over all samples seen so far
    #[default]
    Adjusted,
    /// `ema = α·x + (1 − α)·ema_prev`, seeded with the first close
    Recursive,
}

impl FromStr for EmaWeighting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adjusted" => Ok(Self::Adjusted),
            "recursive" => Ok(Self::Recursive),
            other => Err(format!(
                "unknown EMA weighting '{other}', expected 'adjusted' or 'recursive'"
            )),
        }
    }
}

impl fmt::Display for EmaWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Adjusted => "adjusted",
            Self::Recursive => "recursive",
        })
    }
}

/// Exponential moving average with α = 2 / (window + 1)
///
/// Uses [`EmaWeighting::Adjusted`]; every entry is defined.
pub fn exponential_moving_average(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    exponential_moving_average_with(closes, window, EmaWeighting::Adjusted)
}

/// Exponential moving average with an explicit weighting scheme
pub fn exponential_moving_average_with(
    closes: &[f64],
    window: usize,
    weighting: EmaWeighting,
) -> Result<Vec<Option<f64>>> {
    check_window(window)?;

    match weighting {
        EmaWeighting::Adjusted => {
            let decay = 1.0 - 2.0 / (window as f64 + 1.0);
            let mut numerator = 0.0;
            let mut denominator = 0.0;
            Ok(closes
                .iter()
                .map(|&close| {
                    numerator = close + decay * numerator;
                    denominator = 1.0 + decay * denominator;
                    Some(numerator / denominator)
                })
                .collect())
        }
        EmaWeighting::Recursive => {
            let mut ema = ExponentialMovingAverage::new(window)
                .map_err(|e| MarketError::IndicatorError(e.to_string()))?;
            Ok(closes.iter().map(|&close| Some(ema.next(close))).collect())
        }
    }
}

/// Which moving average a tool computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovingAverageKind {
    Simple,
    Exponential(EmaWeighting),
}

impl MovingAverageKind {
    /// Short label used in overlay names ("20 SMA")
    pub fn label(self) -> &'static str {
        match self {
            Self::Simple => "SMA",
            Self::Exponential(_) => "EMA",
        }
    }

    /// Compute the average over `closes`
    pub fn compute(self, closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
        match self {
            Self::Simple => simple_moving_average(closes, window),
            Self::Exponential(weighting) => {
                exponential_moving_average_with(closes, window, weighting)
            }
        }
    }
}

/// A named overlay aligned with a series' bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Latest value and recent movement of one moving average
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageSummary {
    pub name: String,
    pub span: usize,
    pub latest: Option<f64>,
    /// Change of the average over the requested look-back window
    pub percent_change: Option<f64>,
}

/// Compute one moving average per span over `series`
///
/// The look-back window covers the bars within `days_ago` calendar days of
/// the last bar; the percent change runs from the first defined average in
/// that window to the last one.
pub fn moving_averages(
    series: &HistoricalSeries,
    kind: MovingAverageKind,
    spans: &[usize],
    days_ago: u32,
) -> Result<(Vec<IndicatorSeries>, Vec<MovingAverageSummary>)> {
    let last = series
        .last()
        .ok_or_else(|| MarketError::EmptySeries(series.symbol().to_string()))?;
    let window_start = last
        .timestamp
        .checked_sub_signed(Duration::days(i64::from(days_ago)))
        .ok_or_else(|| {
            MarketError::InvalidWindow(format!("{days_ago} days ago is out of range"))
        })?;
    let first_in_window = series
        .bars()
        .iter()
        .position(|bar| bar.timestamp >= window_start)
        .unwrap_or(0);
    let closes = series.closes();

    let mut overlays = Vec::with_capacity(spans.len());
    let mut summaries = Vec::with_capacity(spans.len());
    for &span in spans {
        let values = kind.compute(&closes, span)?;
        let name = format!("{span} {}", kind.label());

        let latest = values.last().copied().flatten();
        let start = values[first_in_window..].iter().copied().flatten().next();
        let percent_change = start.zip(latest).map(|(old, new)| change_percent(old, new));
        debug!(symbol = series.symbol(), %name, ?latest, ?percent_change, "Moving average");

        summaries.push(MovingAverageSummary {
            name: name.clone(),
            span,
            latest: latest.map(round2),
            percent_change,
        });
        overlays.push(IndicatorSeries { name, values });
    }

    Ok((overlays, summaries))
}

/// Percent change of one symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    pub symbol: String,
    pub percent_change: f64,
}

/// Outcome of a best-performer search
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Highest percent change, first symbol wins ties
    pub best: Option<Performance>,
    /// Every series that was fetched successfully, in input order
    pub series: Vec<HistoricalSeries>,
}

/// Find the symbol with the highest percent change over `days_ago` days
///
/// Symbols are fetched one at a time. A symbol whose lookup or computation
/// fails is logged and skipped; if all fail, `best` is `None`.
pub fn best_performer(accessor: &dyn MarketData, symbols: &[String], days_ago: u32) -> Ranking {
    let mut ranking = Ranking::default();
    // Unrounded change of the current best
    let mut best_change = f64::NEG_INFINITY;

    for symbol in symbols {
        let outcome = accessor
            .history(symbol, days_ago)
            .and_then(|series| raw_percent_change(&series).map(|change| (series, change)));

        match outcome {
            Ok((series, change)) => {
                debug!(%symbol, percent_change = change, "Computed performance");
                if ranking.best.is_none() || change > best_change {
                    best_change = change;
                    ranking.best = Some(Performance {
                        symbol: symbol.clone(),
                        percent_change: round2(change),
                    });
                }
                ranking.series.push(series);
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Could not calculate performance, skipping");
            }
        }
    }

    ranking
}
