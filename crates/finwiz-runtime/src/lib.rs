//! Agent runtime for FinWiz
//!
//! This crate provides the [`AgentExecutor`] tool-calling loop, the
//! [`ToolAgent`] that exposes it through the `Agent` trait, and the
//! [`AgentRuntime`] that hands a shared LLM provider to every agent it
//! builds.

pub mod agents;
pub mod executor;
pub mod runtime;

// Re-export key types
pub use agents::ToolAgent;
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
