//! Error types for utilities

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),

    #[error(transparent)]
    Research(#[from] finwiz_research::ResearchError),

    #[error(transparent)]
    Flow(#[from] finwiz_flow::FlowError),

    #[error(transparent)]
    Llm(#[from] finwiz_llm::LLMError),
}

pub type Result<T> = std::result::Result<T, UtilsError>;
