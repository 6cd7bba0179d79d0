//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Anything that can turn an input plus a [`Context`] into text output.
///
/// Crews, tool-calling agents and whole flows all implement this trait, so a
/// flow stage can hold any of them behind an `Arc<dyn Agent>`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Initialize the agent (optional)
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Shutdown the agent (optional)
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
