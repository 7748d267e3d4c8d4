//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// A provider turns a conversation plus tool definitions into the model's
/// next message.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
