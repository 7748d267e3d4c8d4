//! Tool for the best performer among several tickers

use agent_core::{Error, Result};
use agent_tools::{Tool, parse_args, schema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use super::{DAYS_AGO_DESCRIPTION, days_ago, ticker};
use crate::api::MarketData;
use crate::chart::{self, ChartSink};
use crate::metrics;

const NAME: &str = "get_best_performing";

/// Tool picking the ticker with the highest percent change
///
/// Tickers that cannot be looked up are skipped. The result is `null` when
/// none could be.
pub struct BestPerformingTool {
    accessor: Arc<dyn MarketData>,
    sink: Arc<dyn ChartSink>,
}

#[derive(Debug, Deserialize)]
struct BestPerformingInput {
    stocktickers: Vec<String>,
    days_ago: u32,
}

impl BestPerformingTool {
    pub fn new(accessor: Arc<dyn MarketData>, sink: Arc<dyn ChartSink>) -> Self {
        Self { accessor, sink }
    }
}

impl Tool for BestPerformingTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Useful for when you need to the performance of multiple stocks over a period. \
         You should input a list of stock tickers used on the Yahoo Finance API and also \
         input the number of days to check the change over"
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "stocktickers": schema::array(
                    "Ticker symbols for stocks or indices",
                    schema::string("Ticker symbol"),
                ),
                "days_ago": schema::positive_integer(DAYS_AGO_DESCRIPTION),
            }),
            &["stocktickers", "days_ago"],
        )
    }

    fn call(&self, params: Value) -> Result<Value> {
        let input: BestPerformingInput = parse_args(NAME, params)?;
        if input.stocktickers.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{NAME}: stocktickers must contain at least one ticker"
            )));
        }
        let symbols = input
            .stocktickers
            .iter()
            .map(|raw| ticker(NAME, raw))
            .collect::<Result<Vec<_>>>()?;
        let days = days_ago(NAME, input.days_ago)?;

        let ranking = metrics::best_performer(self.accessor.as_ref(), &symbols, days);
        chart::render_or_log(self.sink.as_ref(), &chart::comparison(&ranking.series));

        match ranking.best {
            Some(best) => {
                info!(symbol = %best.symbol, percent_change = best.percent_change, "Best performer");
                Ok(json!(best))
            }
            None => {
                info!(tickers = symbols.len(), "No ticker could be evaluated");
                Ok(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketData;
    use crate::error::MarketError;
    use crate::series::daily_series;
    use crate::tools::testing::RecordingSink;

    fn mock() -> MockMarketData {
        let mut mock = MockMarketData::new();
        mock.expect_history().returning(|symbol, _| match symbol {
            "A" => Ok(daily_series(symbol, &[100.0, 105.0])),
            "B" => Ok(daily_series(symbol, &[100.0, 98.0])),
            "C" => Ok(daily_series(symbol, &[100.0, 109.0])),
            _ => Err(MarketError::SymbolNotFound {
                symbol: symbol.to_string(),
                reason: "no bars returned".to_string(),
            }),
        });
        mock
    }

    #[test]
    fn test_best_of_three() {
        let sink = Arc::new(RecordingSink::default());
        let tool = BestPerformingTool::new(Arc::new(mock()), sink.clone());

        let result = tool
            .call(json!({ "stocktickers": ["A", "B", "C"], "days_ago": 30 }))
            .unwrap();
        assert_eq!(result, json!({ "symbol": "C", "percent_change": 9.0 }));
        assert_eq!(sink.figures()[0].data.len(), 3);
    }

    #[test]
    fn test_failing_ticker_is_skipped() {
        let tool = BestPerformingTool::new(Arc::new(mock()), Arc::new(RecordingSink::default()));
        let result = tool
            .call(json!({ "stocktickers": ["NOPE", "B", "A"], "days_ago": 30 }))
            .unwrap();
        assert_eq!(result["symbol"], "A");
    }

    #[test]
    fn test_all_failing_is_null() {
        let tool = BestPerformingTool::new(Arc::new(mock()), Arc::new(RecordingSink::default()));
        let result = tool
            .call(json!({ "stocktickers": ["X1", "X2"], "days_ago": 30 }))
            .unwrap();
        assert!(result.is_null());
    }

    #[test]
    fn test_empty_list_rejected() {
        let tool = BestPerformingTool::new(Arc::new(mock()), Arc::new(RecordingSink::default()));
        assert!(matches!(
            tool.call(json!({ "stocktickers": [], "days_ago": 30 })),
            Err(Error::InvalidInput(_))
        ));
    }
}
