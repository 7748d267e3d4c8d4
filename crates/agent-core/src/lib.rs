//! Core abstractions for the time series agent
//!
//! This crate defines the `Agent` trait and the error type shared by the
//! tool, runtime and market crates.

pub mod agent;
pub mod error;

pub use agent::Agent;
pub use error::{Error, Result};
