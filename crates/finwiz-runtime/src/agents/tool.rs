//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use async_trait::async_trait;
use finwiz_core::{Agent, Context, Result};
use tracing::info;

/// An agent that answers through the tool-calling loop
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        info!(agent = %self.name, "Agent started");
        let output = self.executor.run(input).await?;
        info!(agent = %self.name, output_length = output.len(), "Agent finished");
        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
