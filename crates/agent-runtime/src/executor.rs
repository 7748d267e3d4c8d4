//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the function-calling loop:
//! 1. Call the LLM with the conversation and the registered tools
//! 2. If it asked for tools, run them one at a time and append the results
//! 3. Loop until the LLM answers with text (or the iteration cap is hit)

use agent_core::Result;
use agent_llm::{CompletionRequest, LLMProvider, Message, StopReason, ToolCall, ToolDefinition};
use agent_tools::ToolRegistry;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Event handler for agent execution events
///
/// Implement this trait to observe tool calls while a query runs, e.g. to
/// print intermediate steps.
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// Called when a tool execution starts
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// Called when a tool execution completes
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// Called when the agent produces its final answer
    async fn on_complete(&self, _result: &str) {}
}

/// No-op event handler for when events are not needed
pub struct NoOpEventHandler;

#[async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of LLM calls per query (prevents infinite loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gpt-3.5-turbo-0613".to_string(),
            system_prompt: None,
            max_tokens: 1024,
            temperature: 0.0,
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Arc<dyn ExecutorEventHandler>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = handler;
        self
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Run the loop for a single user query
    ///
    /// Each call starts a fresh conversation.
    pub async fn run(&self, user_message: String) -> Result<String> {
        let mut conversation = vec![Message::user(user_message)];
        let tools = self.build_tool_definitions();
        debug!(tool_count = tools.len(), "Available tools");

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                model = %self.config.model,
                "Sending request to LLM"
            );

            let request = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .system(
                    self.config
                        .system_prompt
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
                )
                .max_tokens(self.config.max_tokens)
                .temperature(self.config.temperature)
                .tools(tools.clone())
                .build();

            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| agent_core::Error::ProcessingFailed(e.to_string()))?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let message = response.message;
            if message.has_tool_calls() {
                let calls = message.tool_calls.clone();
                conversation.push(message);
                for call in &calls {
                    conversation.push(self.execute_tool(call).await);
                }
                continue;
            }

            let text = message.text().unwrap_or_default().to_string();
            return match response.stop_reason {
                StopReason::EndTurn | StopReason::ToolUse => {
                    info!(iteration, response_length = text.len(), "Agent completed");
                    self.event_handler.on_complete(&text).await;
                    Ok(text)
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    Ok(if text.is_empty() {
                        "Response truncated due to token limit".to_string()
                    } else {
                        text
                    })
                }
                StopReason::ContentFilter => {
                    warn!("LLM response withheld by content filter");
                    Ok("The response was withheld by the model's content filter".to_string())
                }
            };
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached, stopping"
        );
        Ok("Max iterations reached without completion".to_string())
    }

    /// Build tool definitions from the registry
    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Run one tool call and turn its outcome into a tool message
    ///
    /// Tool failures, including unknown tool names and panicked tool tasks,
    /// become error results the LLM can read.
    async fn execute_tool(&self, call: &ToolCall) -> Message {
        let input_preview: String = call.arguments.to_string().chars().take(500).collect();
        info!(
            tool_name = %call.name,
            tool_id = %call.id,
            input_preview = %input_preview,
            "Executing tool"
        );
        self.event_handler
            .on_tool_start(&call.id, &call.name, &call.arguments)
            .await;

        let start_time = Instant::now();
        let outcome = match self.tool_registry.get(&call.name) {
            Some(tool) => {
                let arguments = call.arguments.clone();
                // Tools block on network I/O
                tokio::task::spawn_blocking(move || tool.call(arguments))
                    .await
                    .unwrap_or_else(|e| {
                        Err(agent_core::Error::ProcessingFailed(format!(
                            "Tool '{}' did not complete: {e}",
                            call.name
                        )))
                    })
            }
            None => Err(agent_core::Error::ToolNotFound(call.name.clone())),
        };
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                let result_str = result.to_string();
                let result_preview: String = result_str.chars().take(500).collect();
                info!(
                    tool_name = %call.name,
                    duration_ms,
                    result_preview = %result_preview,
                    "Tool execution succeeded"
                );
                self.event_handler
                    .on_tool_done(&call.id, &call.name, Ok(&result), duration_ms)
                    .await;
                Message::tool_result(call.id.clone(), result_str)
            }
            Err(e) => {
                let error_str = e.to_string();
                warn!(
                    tool_name = %call.name,
                    duration_ms,
                    error = %e,
                    "Tool execution failed"
                );
                self.event_handler
                    .on_tool_done(&call.id, &call.name, Err(&error_str), duration_ms)
                    .await;
                Message::tool_error(call.id.clone(), format!("Error: {error_str}"))
            }
        }
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
            event_handler: None,
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the event handler
    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        let executor = AgentExecutor::new(provider, self.tool_registry, self.config);
        Ok(match self.event_handler {
            Some(handler) => executor.with_event_handler(handler),
            None => executor,
        })
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::Error;
    use agent_llm::{CompletionResponse, LLMError, Role, TokenUsage};
    use agent_tools::Tool;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request
    struct ScriptedProvider {
        responses: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Price;

    impl Tool for Price {
        fn name(&self) -> &str {
            "get_stock_ticker_price"
        }

        fn description(&self) -> &str {
            "Latest price"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": { "stockticker": { "type": "string" } } })
        }

        fn call(&self, params: Value) -> Result<Value> {
            match params["stockticker"].as_str() {
                Some("AAPL") => Ok(json!(187.44)),
                Some("BOOM") => panic!("quote feed overflowed"),
                Some(other) => Err(Error::ProcessingFailed(format!("Symbol not found: {other}"))),
                None => Err(Error::InvalidInput("stockticker missing".to_string())),
            }
        }
    }

    fn text(content: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(content),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn calls(calls: Vec<(&str, &str, Value)>) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_tool_calls(
                None,
                calls
                    .into_iter()
                    .map(|(id, name, arguments)| ToolCall {
                        id: id.to_string(),
                        name: name.to_string(),
                        arguments,
                    })
                    .collect(),
            ),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn executor(provider: Arc<ScriptedProvider>) -> AgentExecutor {
        let registry = ToolRegistry::new().with_tool(Arc::new(Price));
        AgentExecutorBuilder::new()
            .provider(provider)
            .tool_registry(Arc::new(registry))
            .system_prompt("Answer stock questions")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder() {
        let builder = AgentExecutorBuilder::new()
            .model("test-model")
            .max_iterations(5)
            .temperature(0.3)
            .system_prompt("Test prompt");

        assert_eq!(builder.config.model, "test-model");
        assert_eq!(builder.config.max_iterations, 5);
        assert_eq!(builder.config.temperature, 0.3);
        assert_eq!(builder.config.system_prompt, Some("Test prompt".to_string()));
    }

    #[test]
    fn test_default_config_is_deterministic() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.model, "gpt-3.5-turbo-0613");
    }

    #[test]
    fn test_build_without_provider_fails() {
        let result = AgentExecutorBuilder::new().build();
        assert!(matches!(result, Err(Error::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = ScriptedProvider::new(vec![
            calls(vec![("call_1", "get_stock_ticker_price", json!({ "stockticker": "AAPL" }))]),
            text("AAPL is trading at 187.44."),
        ]);
        let executor = executor(Arc::clone(&provider));

        let answer = executor.run("What is AAPL at?".to_string()).await.unwrap();
        assert_eq!(answer, "AAPL is trading at 187.44.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].temperature, Some(0.0));
        assert_eq!(requests[0].system.as_deref(), Some("Answer stock questions"));
        assert_eq!(requests[0].tools[0].name, "get_stock_ticker_price");

        let second = &requests[1].messages;
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, Role::Assistant);
        assert_eq!(second[2].role, Role::Tool);
        assert_eq!(second[2].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(second[2].text(), Some("187.44"));
    }

    #[tokio::test]
    async fn test_tool_errors_are_returned_to_llm() {
        let provider = ScriptedProvider::new(vec![
            calls(vec![
                ("call_1", "get_stock_ticker_price", json!({ "stockticker": "NOPE" })),
                ("call_2", "no_such_tool", json!({})),
            ]),
            text("I could not find that ticker."),
        ]);
        let executor = executor(Arc::clone(&provider));

        let answer = executor.run("Price of NOPE?".to_string()).await.unwrap();
        assert_eq!(answer, "I could not find that ticker.");

        let messages = &provider.requests()[1].messages;
        assert!(messages[2].is_error);
        assert!(messages[2].text().unwrap().contains("Symbol not found: NOPE"));
        assert!(messages[3].is_error);
        assert!(messages[3].text().unwrap().contains("Tool not found: no_such_tool"));
    }

    #[tokio::test]
    async fn test_panicking_tool_is_returned_to_llm() {
        let provider = ScriptedProvider::new(vec![
            calls(vec![("call_1", "get_stock_ticker_price", json!({ "stockticker": "BOOM" }))]),
            text("The price lookup failed."),
        ]);
        let executor = executor(Arc::clone(&provider));

        let answer = executor.run("Price of BOOM?".to_string()).await.unwrap();
        assert_eq!(answer, "The price lookup failed.");

        let messages = &provider.requests()[1].messages;
        assert!(messages[2].is_error);
        assert!(
            messages[2]
                .text()
                .unwrap()
                .contains("Tool 'get_stock_ticker_price' did not complete")
        );
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let looping: Vec<_> = (0..3)
            .map(|i| {
                calls(vec![(
                    if i == 0 { "a" } else { "b" },
                    "get_stock_ticker_price",
                    json!({ "stockticker": "AAPL" }),
                )])
            })
            .collect();
        let provider = ScriptedProvider::new(looping);
        let registry = ToolRegistry::new().with_tool(Arc::new(Price));
        let executor = AgentExecutorBuilder::new()
            .provider(provider.clone())
            .tool_registry(Arc::new(registry))
            .max_iterations(2)
            .build()
            .unwrap();

        let answer = executor.run("loop".to_string()).await.unwrap();
        assert_eq!(answer, "Max iterations reached without completion");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = ScriptedProvider::new(vec![]);
        let executor = executor(provider);
        let err = executor.run("hi".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::ProcessingFailed(msg) if msg.contains("script exhausted")));
    }
}
