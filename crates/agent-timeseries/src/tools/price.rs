//! Tool for the latest price of a ticker

use agent_core::Result;
use agent_tools::{Tool, parse_args, schema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use super::{TICKER_DESCRIPTION, ticker};
use crate::api::MarketData;

const NAME: &str = "get_stock_ticker_price";

/// Tool returning today's close, rounded to cents
pub struct StockPriceTool {
    accessor: Arc<dyn MarketData>,
}

#[derive(Debug, Deserialize)]
struct PriceInput {
    stockticker: String,
}

impl StockPriceTool {
    pub fn new(accessor: Arc<dyn MarketData>) -> Self {
        Self { accessor }
    }
}

impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Useful for when you need to find out the price of a stock. \
         You should input the stock ticker used on the Yahoo Finance API"
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "stockticker": schema::string(TICKER_DESCRIPTION) }),
            &["stockticker"],
        )
    }

    fn call(&self, params: Value) -> Result<Value> {
        let input: PriceInput = parse_args(NAME, params)?;
        let symbol = ticker(NAME, &input.stockticker)?;

        let price = self.accessor.latest_close(&symbol)?;
        info!(%symbol, price, "Fetched latest price");
        Ok(json!(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketData;
    use crate::error::MarketError;
    use agent_core::Error;

    #[test]
    fn test_tool_metadata() {
        let tool = StockPriceTool::new(Arc::new(MockMarketData::new()));
        assert_eq!(tool.name(), "get_stock_ticker_price");
        assert!(tool.description().contains("price of a stock"));
        assert_eq!(tool.input_schema()["properties"]["stockticker"]["type"], "string");
    }

    #[test]
    fn test_call_returns_price() {
        let mut mock = MockMarketData::new();
        mock.expect_latest_close()
            .withf(|symbol| symbol == "AAPL")
            .returning(|_| Ok(187.44));

        let tool = StockPriceTool::new(Arc::new(mock));
        let price = tool.call(json!({ "stockticker": " AAPL " })).unwrap();
        assert_eq!(price, json!(187.44));
    }

    #[test]
    fn test_unknown_symbol_is_tool_error() {
        let mut mock = MockMarketData::new();
        mock.expect_latest_close().returning(|symbol| {
            Err(MarketError::SymbolNotFound {
                symbol: symbol.to_string(),
                reason: "no bars returned".to_string(),
            })
        });

        let tool = StockPriceTool::new(Arc::new(mock));
        let err = tool.call(json!({ "stockticker": "ZZZZ" })).unwrap_err();
        assert!(matches!(err, Error::ProcessingFailed(msg) if msg.contains("ZZZZ")));
    }

    #[test]
    fn test_missing_argument() {
        let tool = StockPriceTool::new(Arc::new(MockMarketData::new()));
        assert!(matches!(tool.call(json!({})), Err(Error::InvalidInput(_))));
        assert!(matches!(
            tool.call(json!({ "stockticker": 42 })),
            Err(Error::InvalidInput(_))
        ));
    }
}
