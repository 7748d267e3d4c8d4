//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use agent_core::{Agent, Result};
use async_trait::async_trait;

/// An agent that answers queries through the LLM tool-calling loop
///
/// ToolAgent wraps the [`AgentExecutor`] to provide the [`Agent`] trait
/// interface. Every query runs in a fresh conversation.
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn run(&self, query: String) -> Result<String> {
        self.executor.run(query).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
