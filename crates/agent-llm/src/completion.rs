//! Completion request and response types

use crate::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Request for one model turn over the whole conversation so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Conversation history, oldest first
    pub messages: Vec<Message>,

    /// Optional system prompt, sent ahead of `messages`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Tools available for the LLM to call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// Response from LLM completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated assistant message
    pub message: Message,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage statistics
    pub usage: TokenUsage,
}

/// Reason the LLM stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural completion (end of turn)
    EndTurn,

    /// Hit max tokens limit
    MaxTokens,

    /// Tool calls requested
    ToolUse,

    /// Output withheld by the provider's content filter
    ContentFilter,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: usize,

    /// Number of output tokens
    pub output_tokens: usize,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

impl CompletionRequest {
    /// Create a builder for completion requests
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }
}

/// Builder for CompletionRequest
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: CompletionRequest {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: 1024,
                temperature: None,
                tools: Vec::new(),
            },
        }
    }

    /// Set the conversation messages
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.request.messages = messages;
        self
    }

    /// Add a single message
    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    /// Set the maximum tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    /// Set the available tools
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.request.tools = tools;
        self
    }

    /// Build the completion request
    pub fn build(self) -> CompletionRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
            .add_message(Message::user("How did MSFT do this month?"))
            .system("You answer stock questions")
            .max_tokens(512)
            .temperature(0.0)
            .tools(vec![ToolDefinition::new(
                "get_price_change_percent",
                "Percent change",
                json!({ "type": "object" }),
            )])
            .build();

        assert_eq!(request.model, "gpt-3.5-turbo-0613");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.tools.len(), 1);
    }

    #[test]
    fn test_builder_defaults() {
        let request = CompletionRequest::builder("m").build();
        assert_eq!(request.max_tokens, 1024);
        assert!(request.system.is_none());
        assert!(request.temperature.is_none());
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_token_usage() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }
}
