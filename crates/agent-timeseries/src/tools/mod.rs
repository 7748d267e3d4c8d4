//! Market lookup tools exposed to the LLM

pub mod best_performing;
pub mod moving_average;
pub mod percent_change;
pub mod price;

pub use best_performing::BestPerformingTool;
pub use moving_average::MovingAverageTool;
pub use percent_change::PriceChangePercentTool;
pub use price::StockPriceTool;

use crate::api::MarketData;
use crate::chart::ChartSink;
use crate::metrics::EmaWeighting;
use agent_core::{Error, Result};
use agent_tools::{OneOrMany, ToolRegistry};
use std::sync::Arc;

const TICKER_DESCRIPTION: &str = "Ticker symbol for stock or index";
const DAYS_AGO_DESCRIPTION: &str = "Int number of days to look back";
const SPAN_DESCRIPTION: &str = "Int number of days for moving average, or a list of them";

/// Longest look-back accepted from the LLM, about a century
pub const MAX_DAYS_AGO: u32 = 36_500;

/// Longest moving-average span accepted from the LLM
pub const MAX_SPAN: usize = 36_500;

/// Register all five market tools, in a fixed order
pub fn register_market_tools(
    registry: &mut ToolRegistry,
    accessor: Arc<dyn MarketData>,
    sink: Arc<dyn ChartSink>,
    ema_weighting: EmaWeighting,
) {
    registry.register(Arc::new(StockPriceTool::new(Arc::clone(&accessor))));
    registry.register(Arc::new(PriceChangePercentTool::new(
        Arc::clone(&accessor),
        Arc::clone(&sink),
    )));
    registry.register(Arc::new(BestPerformingTool::new(
        Arc::clone(&accessor),
        Arc::clone(&sink),
    )));
    registry.register(Arc::new(MovingAverageTool::simple(
        Arc::clone(&accessor),
        Arc::clone(&sink),
    )));
    registry.register(Arc::new(MovingAverageTool::exponential(
        accessor,
        sink,
        ema_weighting,
    )));
}

/// Trimmed, non-empty ticker
fn ticker(tool: &str, raw: &str) -> Result<String> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(Error::InvalidInput(format!("{tool}: stockticker must not be empty")));
    }
    Ok(symbol.to_string())
}

fn days_ago(tool: &str, days: u32) -> Result<u32> {
    if days == 0 {
        return Err(Error::InvalidInput(format!("{tool}: days_ago must be at least 1")));
    }
    if days > MAX_DAYS_AGO {
        return Err(Error::InvalidInput(format!(
            "{tool}: days_ago must be at most {MAX_DAYS_AGO}, got {days}"
        )));
    }
    Ok(days)
}

fn spans(tool: &str, span: OneOrMany<usize>) -> Result<Vec<usize>> {
    let spans = span.into_vec();
    if spans.is_empty() || spans.contains(&0) {
        return Err(Error::InvalidInput(format!(
            "{tool}: span must be one or more integers of at least 1"
        )));
    }
    if let Some(span) = spans.iter().find(|&&span| span > MAX_SPAN) {
        return Err(Error::InvalidInput(format!(
            "{tool}: span must be at most {MAX_SPAN}, got {span}"
        )));
    }
    Ok(spans)
}
