//! Error types for crews

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrewError {
    /// Agent or task definitions could not be loaded or rendered
    #[error(transparent)]
    Prompt(#[from] finwiz_prompt::PromptError),

    #[error("Crew '{crew}' task '{task}' failed: {source}")]
    TaskFailed {
        crew: String,
        task: String,
        #[source]
        source: finwiz_core::Error,
    },

    #[error("Failed to write task output to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Crew '{0}' has no tasks")]
    NoTasks(String),

    #[error(transparent)]
    Research(#[from] finwiz_research::ResearchError),
}

pub type Result<T> = std::result::Result<T, CrewError>;

impl From<CrewError> for finwiz_core::Error {
    fn from(err: CrewError) -> Self {
        match err {
            CrewError::Prompt(e) => e.into(),
            CrewError::Research(e) => e.into(),
            other => finwiz_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}
