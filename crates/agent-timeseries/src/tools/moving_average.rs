//! Tools for simple and exponential moving averages

use agent_core::{Error, Result};
use agent_tools::{OneOrMany, Tool, parse_args, schema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use super::{DAYS_AGO_DESCRIPTION, SPAN_DESCRIPTION, TICKER_DESCRIPTION, days_ago, spans, ticker};
use crate::api::MarketData;
use crate::chart::{self, ChartSink};
use crate::metrics::{self, EmaWeighting, MovingAverageKind};

/// Tool computing one moving average per requested span
///
/// History is fetched `days_ago + max(span)` days back so the averages are
/// warmed up when the look-back window starts. Each span becomes an overlay
/// on the candlestick chart.
pub struct MovingAverageTool {
    kind: MovingAverageKind,
    accessor: Arc<dyn MarketData>,
    sink: Arc<dyn ChartSink>,
}

#[derive(Debug, Deserialize)]
struct MovingAverageInput {
    stockticker: String,
    days_ago: u32,
    span: OneOrMany<usize>,
}

impl MovingAverageTool {
    /// `get_simple_moving_average`
    pub fn simple(accessor: Arc<dyn MarketData>, sink: Arc<dyn ChartSink>) -> Self {
        Self {
            kind: MovingAverageKind::Simple,
            accessor,
            sink,
        }
    }

    /// `get_exponential_moving_average`
    pub fn exponential(
        accessor: Arc<dyn MarketData>,
        sink: Arc<dyn ChartSink>,
        weighting: EmaWeighting,
    ) -> Self {
        Self {
            kind: MovingAverageKind::Exponential(weighting),
            accessor,
            sink,
        }
    }
}

impl Tool for MovingAverageTool {
    fn name(&self) -> &str {
        match self.kind {
            MovingAverageKind::Simple => "get_simple_moving_average",
            MovingAverageKind::Exponential(_) => "get_exponential_moving_average",
        }
    }

    fn description(&self) -> &str {
        match self.kind {
            MovingAverageKind::Simple => {
                "Useful for when you need to find out the percent change of the simple moving \
                 average of a stock's price. You should input the stock ticker used on the Yahoo \
                 Finance API and also input the number of days to check the change over and also \
                 input the time span for the moving average"
            }
            MovingAverageKind::Exponential(_) => {
                "Useful for when you need to find out the percent change of the exponential \
                 moving average of a stock's price. You should input the stock ticker used on \
                 the Yahoo Finance API and also input the number of days to check the change over \
                 and also input the time span for the moving average"
            }
        }
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "stockticker": schema::string(TICKER_DESCRIPTION),
                "days_ago": schema::positive_integer(DAYS_AGO_DESCRIPTION),
                "span": schema::one_or_many(
                    SPAN_DESCRIPTION,
                    schema::positive_integer("Moving average span in days"),
                ),
            }),
            &["stockticker", "days_ago", "span"],
        )
    }

    fn call(&self, params: Value) -> Result<Value> {
        let name = self.name();
        let input: MovingAverageInput = parse_args(name, params)?;
        let symbol = ticker(name, &input.stockticker)?;
        let days = days_ago(name, input.days_ago)?;
        let spans = spans(name, input.span)?;

        let longest = spans.iter().copied().max().unwrap_or_default();
        let warmup = u32::try_from(longest)
            .map_err(|_| Error::InvalidInput(format!("{name}: span {longest} is too large")))?;
        let series = self.accessor.history(&symbol, days.saturating_add(warmup))?;

        let (overlays, summaries) = metrics::moving_averages(&series, self.kind, &spans, days)?;
        info!(%symbol, days_ago = days, ?spans, kind = self.kind.label(), "Computed moving averages");

        let mut figure = chart::candlestick(&series, days);
        figure.add_overlays(&series, &overlays);
        chart::render_or_log(self.sink.as_ref(), &figure);

        Ok(json!({
            "symbol": symbol,
            "days_ago": days,
            "moving_averages": summaries,
        }))
    }
}
