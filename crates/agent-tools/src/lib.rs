//! Tool framework for the time series agent
//!
//! A tool is a named, schema-described function an LLM can ask the agent
//! to call. Tools run synchronously; their async entry point always fails
//! with [`agent_core::Error::Unsupported`].

pub mod args;
pub mod registry;
pub mod schema;
pub mod tool;

pub use args::{OneOrMany, parse_args};
pub use registry::ToolRegistry;
pub use tool::Tool;
