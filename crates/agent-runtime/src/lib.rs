//! Agent runtime for executing tool-using agents
//!
//! The [`AgentExecutor`] drives the loop between an LLM provider and a tool
//! registry; [`ToolAgent`] exposes it through the `Agent` trait.

pub mod agents;
pub mod executor;

// Re-export key types
pub use agents::ToolAgent;
pub use executor::{
    AgentExecutor, AgentExecutorBuilder, ExecutorConfig, ExecutorEventHandler, NoOpEventHandler,
};
