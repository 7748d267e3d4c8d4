//! Time Series Agent CLI
//!
//! Ask an LLM about stock prices; it answers by calling the market tools.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//!
//! timeseries-agent ask "How has AAPL done over the last 30 days?"
//! timeseries-agent --chart-dir charts chat
//! timeseries-agent tools
//! timeseries-agent call get_price_change_percent '{"stockticker": "MSFT", "days_ago": 7}'
//! ```

use agent_core::Agent;
use agent_llm::providers::OpenAIProvider;
use agent_runtime::{ExecutorEventHandler, NoOpEventHandler};
use agent_timeseries::{
    EmaWeighting, MarketConfig, TimeSeriesAgent, chart_sink, data_accessor, market_tools,
};
use agent_utils::LogFormat;
use anyhow::{Context, bail};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "timeseries-agent")]
#[command(about = "Answer stock market questions with an LLM and market data tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write an HTML chart for every lookup into this directory
    #[arg(long, global = true, env = "TIMESERIES_CHART_DIR")]
    chart_dir: Option<PathBuf>,

    /// Chat model to use
    #[arg(long, global = true, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// EMA weighting (adjusted, recursive)
    #[arg(long, global = true, env = "TIMESERIES_EMA_WEIGHTING")]
    ema_weighting: Option<EmaWeighting>,

    /// Print each tool call and its result
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Ask questions interactively, one per line
    Chat,

    /// List the available tools and their input schemas
    Tools,

    /// Invoke one tool directly with JSON arguments
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

/// Prints intermediate steps
struct VerboseHandler;

#[async_trait]
impl ExecutorEventHandler for VerboseHandler {
    async fn on_tool_start(&self, _id: &str, name: &str, input: &Value) {
        println!("Invoking `{name}` with `{input}`");
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        result: std::result::Result<&Value, &str>,
        duration_ms: u64,
    ) {
        match result {
            Ok(value) => println!("{value} ({duration_ms} ms)"),
            Err(e) => println!("Error: {e} ({duration_ms} ms)"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::load_env_file();
    let cli = Cli::parse();

    let settings = agent_utils::Config::from_env()?;
    agent_utils::init_tracing_with(
        &settings.log_filter,
        cli.log_format.unwrap_or(settings.log_format),
    );

    let mut builder = MarketConfig::builder();
    if let Some(dir) = &cli.chart_dir {
        builder = builder.chart_dir(dir.clone());
    }
    if let Some(model) = &cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(weighting) = cli.ema_weighting {
        builder = builder.ema_weighting(weighting);
    }
    let config = builder.build()?;

    println!("{}", settings.app_name);
    println!();

    match cli.command {
        Commands::Tools => list_tools(&config)?,
        Commands::Call { tool, args } => call_tool(&config, tool, &args).await?,
        Commands::Ask { query } => {
            let agent = build_agent(&config, cli.verbose)?;
            let answer = agent.run(query.join(" ")).await?;
            println!("{answer}");
        }
        Commands::Chat => {
            let agent = build_agent(&config, cli.verbose)?;
            chat(&agent).await?;
        }
    }

    Ok(())
}

/// Fails before any tool runs when the credential is missing
fn build_agent(config: &MarketConfig, verbose: bool) -> anyhow::Result<TimeSeriesAgent> {
    let provider = OpenAIProvider::from_env().context("cannot create the OpenAI client")?;
    let handler: Arc<dyn ExecutorEventHandler> = if verbose {
        Arc::new(VerboseHandler)
    } else {
        Arc::new(NoOpEventHandler)
    };

    info!(model = %config.model, charts = ?config.chart_dir, "Starting agent");
    let agent = TimeSeriesAgent::with_parts(
        config,
        Arc::new(provider),
        data_accessor(config),
        chart_sink(config),
        handler,
    )?;
    Ok(agent)
}

fn list_tools(config: &MarketConfig) -> anyhow::Result<()> {
    let registry = market_tools(config, data_accessor(config), chart_sink(config));
    for tool in registry.list_tools() {
        println!("{}", tool.name());
        println!("  {}", tool.description());
        println!("  {}", serde_json::to_string_pretty(&tool.input_schema())?.replace('\n', "\n  "));
        println!();
    }
    Ok(())
}

async fn call_tool(config: &MarketConfig, tool: String, args: &str) -> anyhow::Result<()> {
    let params: Value = serde_json::from_str(args).context("arguments must be valid JSON")?;
    let registry = market_tools(config, data_accessor(config), chart_sink(config));
    if registry.get(&tool).is_none() {
        bail!(
            "unknown tool '{tool}', expected one of: {}",
            registry.names().join(", ")
        );
    }

    // Market lookups block on network I/O
    let result = tokio::task::spawn_blocking(move || registry.call(&tool, params)).await??;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn chat(agent: &TimeSeriesAgent) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("Please enter your question here: ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        let query = input.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        match agent.run(query.to_string()).await {
            Ok(answer) => println!("{answer}\n"),
            Err(e) => {
                error!(error = %e, "Query failed");
                eprintln!("Error: {e}\n");
            }
        }
    }

    Ok(())
}
