//! Crew configuration and prompt assembly for FinWiz
//!
//! - [`CrewConfig`] loads per-crew `agents.yaml` and `tasks.yaml`, keeps
//!   their order, appends the shared agent handbook and fills `{name}`
//!   placeholders from the flow inputs.
//! - [`AgentPrompt`] and [`TaskPrompt`] render the system and task prompts
//!   with MiniJinja.

pub mod config;
pub mod error;
pub mod interpolate;
pub mod template;

pub use config::{AGENTS_FILE, AgentSpec, CrewConfig, Named, TASKS_FILE, TaskSpec};
pub use error::{PromptError, Result};
pub use interpolate::{interpolate, placeholders};
pub use template::{AgentPrompt, ContextBlock, JinjaTemplate, TaskPrompt};
