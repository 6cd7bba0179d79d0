//! Error types for prompt and crew configuration operations

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur while loading crew configuration or rendering prompts
#[derive(Error, Debug)]
pub enum PromptError {
    /// A configuration file could not be found
    #[error("Configuration file '{0}' not found")]
    ConfigNotFound(String),

    /// A configuration file was empty
    #[error("Configuration '{0}' is empty")]
    EmptyConfig(String),

    /// A configuration file did not hold a mapping at its top level
    #[error("Configuration '{0}' must be a mapping of names to definitions")]
    NotAMapping(String),

    /// A configuration file could not be parsed
    #[error("Failed to parse configuration '{source_name}': {detail}")]
    InvalidYaml { source_name: String, detail: String },

    /// A task names an agent that is not defined
    #[error("Task '{task}' references unknown agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    /// A task lists a context task that is not defined before it
    #[error("Task '{task}' uses context '{context}' which is not an earlier task")]
    UnknownContextTask { task: String, context: String },

    /// Template rendering failed
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// Placeholder pattern failed to compile
    #[error("Invalid placeholder pattern: {0}")]
    InvalidPattern(String),

    /// File loading error
    #[error("Failed to load file '{path}': {detail}")]
    FileLoadError { path: String, detail: String },
}

impl From<PromptError> for finwiz_core::Error {
    fn from(err: PromptError) -> Self {
        finwiz_core::Error::Configuration(err.to_string())
    }
}
