//! Error types for finwiz-core

use thiserror::Error;

/// Result type alias for finwiz-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// A tool could not complete its call
    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Shorthand for [`Error::ToolFailed`]
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
