//! Core Agent trait definition

use crate::Result;
use async_trait::async_trait;

/// An agent turns one free-text query into one free-text answer
///
/// Agents hold no session state between calls; every `run` starts from an
/// empty conversation.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer a single query
    async fn run(&self, query: String) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn run(&self, query: String) -> Result<String> {
            Ok(query.to_uppercase())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_agent_object_safety() {
        let agent: Box<dyn Agent> = Box::new(Echo);
        assert_eq!(agent.name(), "echo");
        assert_eq!(agent.run("aapl".to_string()).await.unwrap(), "AAPL");
    }
}
