//! Tool for the percent change of a ticker over a look-back window

use agent_core::Result;
use agent_tools::{Tool, parse_args, schema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use super::{DAYS_AGO_DESCRIPTION, TICKER_DESCRIPTION, days_ago, ticker};
use crate::api::MarketData;
use crate::chart::{self, ChartSink};
use crate::metrics;

const NAME: &str = "get_price_change_percent";

/// Tool returning the close-to-close percent change over `days_ago` days
///
/// Also renders a candlestick chart of the fetched window.
pub struct PriceChangePercentTool {
    accessor: Arc<dyn MarketData>,
    sink: Arc<dyn ChartSink>,
}

#[derive(Debug, Deserialize)]
struct PercentChangeInput {
    stockticker: String,
    days_ago: u32,
}

impl PriceChangePercentTool {
    pub fn new(accessor: Arc<dyn MarketData>, sink: Arc<dyn ChartSink>) -> Self {
        Self { accessor, sink }
    }
}

impl Tool for PriceChangePercentTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Useful for when you need to find out the percentage change in a stock's value. \
         You should input the stock ticker used on the Yahoo Finance API and also input \
         the number of days to check the change over"
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "stockticker": schema::string(TICKER_DESCRIPTION),
                "days_ago": schema::positive_integer(DAYS_AGO_DESCRIPTION),
            }),
            &["stockticker", "days_ago"],
        )
    }

    fn call(&self, params: Value) -> Result<Value> {
        let input: PercentChangeInput = parse_args(NAME, params)?;
        let symbol = ticker(NAME, &input.stockticker)?;
        let days = days_ago(NAME, input.days_ago)?;

        let series = self.accessor.history(&symbol, days)?;
        let change = metrics::percent_change(&series)?;
        info!(%symbol, days_ago = days, percent_change = change, "Computed percent change");

        chart::render_or_log(self.sink.as_ref(), &chart::candlestick(&series, days));
        Ok(json!(change))
    }
}
