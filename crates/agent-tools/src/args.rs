//! Typed argument parsing for tool inputs

use agent_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize tool parameters into a typed input struct
///
/// LLMs occasionally send `null` instead of an empty object for tools
/// without arguments, so `null` is treated as `{}`.
pub fn parse_args<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| Error::InvalidInput(format!("{tool}: {e}")))
}

/// A parameter accepted either as a single value or a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single value
    One(T),
    /// A list of values
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Flatten into a vector, preserving order
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Input {
        stockticker: String,
        days_ago: u32,
        span: Option<OneOrMany<u32>>,
    }

    #[test]
    fn test_parse_valid_args() {
        let input: Input = parse_args(
            "t",
            json!({ "stockticker": "AAPL", "days_ago": 30, "span": [5, 20], "extra": true }),
        )
        .unwrap();
        assert_eq!(input.stockticker, "AAPL");
        assert_eq!(input.days_ago, 30);
        assert_eq!(input.span.unwrap().into_vec(), vec![5, 20]);
    }

    #[test]
    fn test_span_as_single_integer() {
        let input: Input =
            parse_args("t", json!({ "stockticker": "MSFT", "days_ago": 7, "span": 10 })).unwrap();
        assert_eq!(input.span, Some(OneOrMany::One(10)));
    }

    #[test]
    fn test_missing_field_is_invalid_input() {
        let err = parse_args::<Input>("get_x", json!({ "stockticker": "AAPL" })).unwrap_err();
        match err {
            Error::InvalidInput(msg) => {
                assert!(msg.starts_with("get_x:"));
                assert!(msg.contains("days_ago"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_days_rejected() {
        let result = parse_args::<Input>("t", json!({ "stockticker": "AAPL", "days_ago": -3 }));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
