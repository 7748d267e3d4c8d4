//! Tool trait definition

use agent_core::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Tools are functions that LLM agents can call to look things up. Each tool
/// provides a name, a description the LLM reads when choosing tools, and a
/// JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    ///
    /// This description helps the LLM understand when to use this tool
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use agent_tools::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({
    ///         "stockticker": schema::string("Ticker symbol for stock or index"),
    ///         "days_ago": schema::positive_integer("Int number of days to look back"),
    ///     }),
    ///     &["stockticker", "days_ago"],
    /// );
    /// assert_eq!(schema["required"][1], "days_ago");
    /// ```
    fn input_schema(&self) -> Value;

    /// Invoke the tool and block until it returns
    ///
    /// `params` should match `input_schema`; mismatches are reported as
    /// [`Error::InvalidInput`].
    fn call(&self, params: Value) -> Result<Value>;

    /// Asynchronous invocation
    ///
    /// Not supported: every implementation fails immediately.
    async fn call_async(&self, _params: Value) -> Result<Value> {
        Err(Error::Unsupported(format!(
            "tool '{}' does not support async invocation",
            self.name()
        )))
    }
}
