//! Error types for market data operations

use thiserror::Error;

/// Market lookup, metric and chart errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// The provider knows no such symbol or returned no bars for it
    #[error("Symbol not found: {symbol} ({reason})")]
    SymbolNotFound {
        symbol: String,
        reason: String,
    },

    /// A metric was asked for over a series without samples
    #[error("No price data for {0}")]
    EmptySeries(String),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Window or span outside the accepted range
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Chart could not be written
    #[error("Chart error: {0}")]
    ChartError(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Convert MarketError to agent_core::Error
impl From<MarketError> for agent_core::Error {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::InvalidWindow(_) => agent_core::Error::InvalidInput(err.to_string()),
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::SymbolNotFound {
            symbol: "ZZZZ".to_string(),
            reason: "no bars returned".to_string(),
        };
        assert_eq!(err.to_string(), "Symbol not found: ZZZZ (no bars returned)");

        let err = MarketError::EmptySeries("AAPL".to_string());
        assert_eq!(err.to_string(), "No price data for AAPL");
    }

    #[test]
    fn test_error_conversion() {
        let agent_err: agent_core::Error =
            MarketError::YahooFinanceError("timeout".to_string()).into();
        match agent_err {
            agent_core::Error::ProcessingFailed(msg) => assert!(msg.contains("Yahoo Finance")),
            _ => panic!("Expected ProcessingFailed variant"),
        }

        let agent_err: agent_core::Error =
            MarketError::InvalidWindow("span must be at least 1".to_string()).into();
        assert!(matches!(agent_err, agent_core::Error::InvalidInput(_)));
    }
}
