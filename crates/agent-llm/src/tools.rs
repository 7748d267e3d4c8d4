//! Tool definition types for LLM tool use

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition for LLM provider
///
/// This describes a tool that the LLM can call: its name, description, and
/// input schema in JSON Schema format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the tool in the registry)
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
