//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by agents and tools
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent construction failed (missing credential, bad config)
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent or tool processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// Tool arguments did not match the declared input schema
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No tool registered under the requested name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The requested invocation mode is not supported
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    /// Whether this error signals an unsupported invocation
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ToolNotFound("get_quote".to_string());
        assert_eq!(err.to_string(), "Tool not found: get_quote");

        let err = Error::Unsupported("async".to_string());
        assert_eq!(err.to_string(), "Unsupported operation: async");
        assert!(err.is_unsupported());
        assert!(!Error::Generic("x".to_string()).is_unsupported());
    }
}
