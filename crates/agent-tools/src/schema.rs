//! Helpers to build JSON schemas for tool inputs

use serde_json::{Value, json};

/// Create a JSON schema for an object with properties
///
/// # Example
///
/// ```
/// use agent_tools::schema;
/// use serde_json::json;
///
/// let schema = schema::object(
///     json!({ "stockticker": schema::string("Ticker symbol") }),
///     &["stockticker"],
/// );
/// assert_eq!(schema["type"], "object");
/// ```
pub fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// String property schema
pub fn string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}

/// Integer property schema restricted to values ≥ 1
pub fn positive_integer(description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "description": description,
    })
}

/// Array property schema
pub fn array(description: &str, items: Value) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": items,
    })
}

/// A value that may be given once or as a non-empty list
pub fn one_or_many(description: &str, item: Value) -> Value {
    json!({
        "description": description,
        "anyOf": [
            item,
            { "type": "array", "items": item, "minItems": 1 },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_schema() {
        let schema = object(
            json!({
                "stocktickers": array("Ticker symbols", string("Ticker")),
                "days_ago": positive_integer("Days"),
            }),
            &["stocktickers", "days_ago"],
        );

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["stocktickers"]["type"], "array");
        assert_eq!(schema["properties"]["stocktickers"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["days_ago"]["minimum"], 1);
        assert_eq!(schema["required"], json!(["stocktickers", "days_ago"]));
    }

    #[test]
    fn test_one_or_many() {
        let schema = one_or_many("Window sizes", json!({ "type": "integer", "minimum": 1 }));
        let variants = schema["anyOf"].as_array().unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0]["type"], "integer");
        assert_eq!(variants[1]["type"], "array");
        assert_eq!(variants[1]["items"]["minimum"], 1);
    }
}
