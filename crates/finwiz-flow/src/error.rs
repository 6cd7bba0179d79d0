//! Error types for flows

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Stage '{0}' is declared more than once")]
    DuplicateStage(String),

    #[error("Stage '{stage}' runs after unknown stage '{dependency}'")]
    UnknownDependency { stage: String, dependency: String },

    #[error("Stages form a cycle: {}", .0.join(", "))]
    Cycle(Vec<String>),

    #[error("Flow has no stages")]
    Empty,

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: finwiz_core::Error,
    },

    #[error("Failed to write stage cache {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render flow plot: {0}")]
    Plot(String),

    #[error("Invalid flow configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Crew(#[from] finwiz_crews::CrewError),
}

pub type Result<T> = std::result::Result<T, FlowError>;

impl From<FlowError> for finwiz_core::Error {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Config(msg) => finwiz_core::Error::Configuration(msg),
            FlowError::Crew(e) => e.into(),
            other => finwiz_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}
