//! Tool registry for managing available tools

use crate::Tool;
use agent_core::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name → tool map, listed in registration order
///
/// The registry is filled once while the agent is assembled and shared
/// read-only (behind an `Arc`) afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    ///
    /// A tool registered under an existing name replaces the earlier one and
    /// keeps its position.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!(tool = %name, "Registering tool");
        if let Some(&pos) = self.index.get(&name) {
            self.tools[pos] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&pos| Arc::clone(&self.tools[pos]))
    }

    /// Invoke a tool by name
    pub fn call(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        tool.call(params)
    }

    /// List all registered tools
    ///
    /// This is useful for building tool definitions to send to the LLM.
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
