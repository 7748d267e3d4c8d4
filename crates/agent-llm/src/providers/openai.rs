//! OpenAI provider implementation
//!
//! Implements [`LLMProvider`] over the chat-completions endpoint with
//! function calling. Works with any OpenAI-compatible server by changing
//! the API base.
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! ```no_run
//! use agent_llm::{CompletionRequest, LLMProvider, Message};
//! use agent_llm::providers::OpenAIProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Fails here when OPENAI_API_KEY is not set
//!     let provider = OpenAIProvider::from_env()?;
//!
//!     let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
//!         .add_message(Message::user("Hello!"))
//!         .temperature(0.0)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, StopReason,
    TokenUsage, ToolCall, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "OPENAI_API_BASE";

/// Configuration for OpenAI provider
#[derive(Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from the process environment
    ///
    /// `OPENAI_API_KEY` is required; `OPENAI_API_BASE` is optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LLMError::ConfigurationError(format!("{API_KEY_ENV} environment variable not set"))
            })?;

        let config = Self::new(api_key);
        Ok(match lookup(API_BASE_ENV).filter(|b| !b.trim().is_empty()) {
            Some(api_base) => config.with_api_base(api_base),
            None => config,
        })
    }

    /// Set custom API base URL (Azure OpenAI, local servers, ...)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"***")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// OpenAI chat-completions provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new OpenAI provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Create a provider from the process environment
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = build_request(request);
        debug!(
            messages = body.messages.len(),
            tools = body.tools.as_ref().map_or(0, Vec::len),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(body.model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let wire: WireResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        parse_response(wire)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion
// ============================================================================

fn build_request(request: CompletionRequest) -> WireRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system {
        messages.push(to_wire_message(Message::system(system)));
    }
    messages.extend(request.messages.into_iter().map(to_wire_message));

    let tools = (!request.tools.is_empty()).then(|| convert_tools(&request.tools));

    WireRequest {
        model: request.model,
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools,
    }
}

fn to_wire_message(message: Message) -> WireMessage {
    let tool_calls = message.has_tool_calls().then(|| {
        message
            .tool_calls
            .into_iter()
            .map(|call| WireToolCall {
                id: call.id,
                kind: function_kind(),
                function: WireFunctionCall {
                    name: call.name,
                    arguments: call.arguments.to_string(),
                },
            })
            .collect()
    });

    WireMessage {
        role: message.role.as_str().to_string(),
        content: message.content,
        tool_calls,
        tool_call_id: message.tool_call_id,
    }
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<WireTool> {
    tools
        .iter()
        .map(|tool| WireTool {
            kind: "function",
            function: WireFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn parse_response(wire: WireResponse) -> Result<CompletionResponse> {
    // Only one choice is requested
    let choice = wire
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    let mut tool_calls = Vec::new();
    for call in choice.message.tool_calls.unwrap_or_default() {
        let arguments = parse_arguments(&call.function.arguments)?;
        tool_calls.push(ToolCall {
            id: call.id,
            name: call.function.name,
            arguments,
        });
    }

    let content = choice.message.content.filter(|c| !c.is_empty());
    let stop_reason = match choice.finish_reason.as_deref() {
        // Some compatible servers report "stop" even when they emitted calls
        _ if !tool_calls.is_empty() => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => StopReason::ContentFilter,
        Some(other) => {
            if other != "stop" {
                debug!(finish_reason = other, "Unknown finish reason");
            }
            StopReason::EndTurn
        }
        None => StopReason::EndTurn,
    };

    let usage = wire
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        message: Message::assistant_tool_calls(content, tool_calls),
        stop_reason,
        usage,
    })
}

/// Decode the JSON-string arguments of a function call
///
/// An empty string means "no arguments".
fn parse_arguments(raw: &str) -> Result<serde_json::Value> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw)
        .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        move |k| vars.get(k).map(ToString::to_string)
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.config().api_key, "test-key");
        assert_eq!(provider.config().api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_config_from_lookup() {
        let config = OpenAIConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-test"),
            (API_BASE_ENV, "http://localhost:1234/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.completions_url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let err = OpenAIConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, LLMError::ConfigurationError(_)));

        let err = OpenAIConfig::from_lookup(lookup(&[(API_KEY_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, LLMError::ConfigurationError(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = OpenAIConfig::new("sk-secret").with_timeout(30);
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("30"));
    }

    #[test]
    fn test_request_conversion() {
        let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
            .system("You answer stock questions")
            .add_message(Message::user("Price of AAPL?"))
            .add_message(Message::assistant_tool_calls(
                None,
                vec![ToolCall {
                    id: "call_1".to_string(),
                    name: "get_stock_ticker_price".to_string(),
                    arguments: json!({ "stockticker": "AAPL" }),
                }],
            ))
            .add_message(Message::tool_result("call_1", "187.44"))
            .temperature(0.0)
            .tools(vec![ToolDefinition::new(
                "get_stock_ticker_price",
                "Latest price",
                json!({ "type": "object" }),
            )])
            .build();

        let wire = serde_json::to_value(build_request(request)).unwrap();

        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][1]["role"], "user");
        assert_eq!(wire["messages"][2]["role"], "assistant");
        assert_eq!(wire["messages"][2]["content"], serde_json::Value::Null);
        assert_eq!(wire["messages"][2]["tool_calls"][0]["type"], "function");
        assert_eq!(
            wire["messages"][2]["tool_calls"][0]["function"]["arguments"],
            r#"{"stockticker":"AAPL"}"#
        );
        assert_eq!(wire["messages"][3]["role"], "tool");
        assert_eq!(wire["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(wire["temperature"], 0.0);
        assert_eq!(wire["tools"][0]["type"], "function");
        assert_eq!(wire["tools"][0]["function"]["name"], "get_stock_ticker_price");
    }

    #[test]
    fn test_no_tools_field_without_tools() {
        let request = CompletionRequest::builder("m")
            .add_message(Message::user("hi"))
            .build();
        let wire = serde_json::to_value(build_request(request)).unwrap();
        assert!(wire.get("tools").is_none());
        assert!(wire.get("temperature").is_none());
    }

    #[test]
    fn test_parse_tool_call_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {
                            "name": "get_best_performing",
                            "arguments": "{\"stocktickers\":[\"AAPL\",\"MSFT\"],\"days_ago\":30}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 30 }
        }))
        .unwrap();

        let response = parse_response(wire).unwrap();
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage.total(), 150);
        assert_eq!(response.message.role, Role::Assistant);
        let call = &response.message.tool_calls[0];
        assert_eq!(call.id, "call_9");
        assert_eq!(call.name, "get_best_performing");
        assert_eq!(call.arguments["days_ago"], 30);
    }

    #[test]
    fn test_parse_text_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "choices": [{
                "message": { "role": "assistant", "content": "AAPL closed at 187.44." },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let response = parse_response(wire).unwrap();
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.message.text(), Some("AAPL closed at 187.44."));
        assert_eq!(response.usage, TokenUsage::default());
    }

    #[test]
    fn test_finish_reason_mapping() {
        for (reason, expected) in [
            ("length", StopReason::MaxTokens),
            ("content_filter", StopReason::ContentFilter),
            ("something_new", StopReason::EndTurn),
        ] {
            let wire: WireResponse = serde_json::from_value(json!({
                "choices": [{ "message": { "role": "assistant", "content": "x" }, "finish_reason": reason }]
            }))
            .unwrap();
            assert_eq!(parse_response(wire).unwrap().stop_reason, expected);
        }
    }

    #[test]
    fn test_empty_choices_is_error() {
        let wire: WireResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(parse_response(wire), Err(LLMError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_bad_arguments_are_reported() {
        assert!(parse_arguments("").unwrap().as_object().unwrap().is_empty());
        assert!(matches!(
            parse_arguments("{not json"),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }
}
