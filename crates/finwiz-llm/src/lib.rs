//! LLM provider abstraction for FinWiz
//!
//! This crate provides provider-agnostic abstractions for talking to a
//! language model:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Tool definitions for function calling
//! - [`LLMProvider`] (async) and [`BlockingLLMProvider`] traits
//! - An OpenAI-compatible provider in both flavours
//! - [`RetryingProvider`], the exponential-backoff wrapper every crew call
//!   goes through

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod retry;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::{BlockingLLMProvider, LLMProvider};
pub use retry::{Generation, RetryPolicy, RetryingProvider};
pub use tools::ToolDefinition;
