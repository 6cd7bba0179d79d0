//! LLM provider traits

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Asynchronous access to a language model
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}

/// Blocking access to a language model, for callers outside an async runtime
pub trait BlockingLLMProvider: Send + Sync {
    /// Generate a completion, blocking the current thread
    fn complete_blocking(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
