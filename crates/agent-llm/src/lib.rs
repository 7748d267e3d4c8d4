//! LLM provider abstraction layer for the time series agent
//!
//! This crate provides provider-agnostic types for talking to a chat model
//! with function calling:
//!
//! - Message types for a tool-using conversation
//! - Completion request/response types
//! - Tool definitions sent to the model
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role, ToolCall};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
