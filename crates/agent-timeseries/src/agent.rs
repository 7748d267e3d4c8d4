//! Time series agent: an LLM that answers stock questions with market tools

use agent_core::{Agent, Error, Result};
use agent_llm::LLMProvider;
use agent_llm::providers::OpenAIProvider;
use agent_runtime::{
    AgentExecutorBuilder, ExecutorEventHandler, NoOpEventHandler, ToolAgent,
};
use agent_tools::ToolRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::api::{self, MarketData};
use crate::chart::{ChartSink, HtmlChartSink, NoopChartSink};
use crate::config::MarketConfig;
use crate::tools::register_market_tools;

const SYSTEM_PROMPT: &str = r#"You are a stock market assistant.

Answer questions about stock and index prices using the available tools:
- get_stock_ticker_price for the current price
- get_price_change_percent for the change over a number of days
- get_best_performing to compare several tickers
- get_simple_moving_average and get_exponential_moving_average for trends

Use Yahoo Finance ticker symbols (e.g. AAPL, MSFT, ^GSPC). Percentages are
already rounded to two decimals. If a tool reports an error, tell the user
what could not be looked up instead of guessing a number.
"#;

/// Chart sink matching `config`: HTML pages when a chart directory is set
pub fn chart_sink(config: &MarketConfig) -> Arc<dyn ChartSink> {
    match &config.chart_dir {
        Some(dir) => Arc::new(HtmlChartSink::new(dir.clone())),
        None => Arc::new(NoopChartSink),
    }
}

/// Registry holding the five market tools
pub fn market_tools(
    config: &MarketConfig,
    accessor: Arc<dyn MarketData>,
    sink: Arc<dyn ChartSink>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_market_tools(&mut registry, accessor, sink, config.ema_weighting);
    registry
}

/// Agent answering stock questions through the market tools
pub struct TimeSeriesAgent {
    agent: ToolAgent,
}

impl TimeSeriesAgent {
    /// Create the agent with the OpenAI provider configured from the environment
    ///
    /// Fails when `OPENAI_API_KEY` is missing, before any tool runs.
    pub fn from_env(config: &MarketConfig) -> Result<Self> {
        let provider = OpenAIProvider::from_env()
            .map_err(|e| Error::InitializationFailed(e.to_string()))?;
        Self::new(config, Arc::new(provider))
    }

    /// Create the agent with the configured data provider and chart output
    pub fn new(config: &MarketConfig, provider: Arc<dyn LLMProvider>) -> Result<Self> {
        Self::with_parts(
            config,
            provider,
            api::data_accessor(config),
            chart_sink(config),
            Arc::new(NoOpEventHandler),
        )
    }

    /// Create the agent from explicit parts
    pub fn with_parts(
        config: &MarketConfig,
        provider: Arc<dyn LLMProvider>,
        accessor: Arc<dyn MarketData>,
        sink: Arc<dyn ChartSink>,
        event_handler: Arc<dyn ExecutorEventHandler>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::InitializationFailed(e.to_string()))?;

        let tools = market_tools(config, accessor, sink);
        info!(
            provider = provider.name(),
            model = %config.model,
            tools = tools.len(),
            "Creating time series agent"
        );

        let executor = AgentExecutorBuilder::new()
            .provider(provider)
            .tool_registry(Arc::new(tools))
            .model(config.model.clone())
            .temperature(config.temperature)
            .max_iterations(config.max_iterations)
            .system_prompt(SYSTEM_PROMPT)
            .event_handler(event_handler)
            .build()?;

        Ok(Self {
            agent: ToolAgent::new(executor, "timeseries-agent"),
        })
    }

    /// Tools available to the agent
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        self.agent.executor().tools()
    }
}

#[async_trait]
impl Agent for TimeSeriesAgent {
    async fn run(&self, query: String) -> Result<String> {
        self.agent.run(query).await
    }

    fn name(&self) -> &str {
        self.agent.name()
    }
}
