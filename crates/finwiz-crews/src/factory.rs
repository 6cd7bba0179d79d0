//! Builds the FinWiz crews from shared runtime and research tools

use crate::crew::Crew;
use crate::definition;
use crate::error::Result;
use finwiz_core::Domain;
use finwiz_research::ResearchToolkit;
use finwiz_runtime::AgentRuntime;
use std::path::PathBuf;
use std::sync::Arc;

/// Creates one [`Crew`] per domain.
///
/// Crew output goes to `{output_root}/{domain}`. The output root defaults
/// to the toolkit's, so the report crew's directory reader sees what the
/// other crews wrote.
#[derive(Clone)]
pub struct CrewFactory {
    runtime: Arc<AgentRuntime>,
    toolkit: ResearchToolkit,
    output_root: PathBuf,
    config_root: Option<PathBuf>,
}

impl CrewFactory {
    pub fn new(runtime: Arc<AgentRuntime>, toolkit: ResearchToolkit) -> Self {
        let output_root = toolkit.config().output_root.clone();
        Self {
            runtime,
            toolkit,
            output_root,
            config_root: None,
        }
    }

    /// Load crew YAML and the handbook from `dir` instead of the embedded copies
    pub fn with_config_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_root = Some(dir.into());
        self
    }

    pub fn with_output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_root = dir.into();
        self
    }

    pub fn toolkit(&self) -> &ResearchToolkit {
        &self.toolkit
    }

    pub fn build(&self, domain: Domain) -> Result<Crew> {
        let config = definition::load(domain, self.config_root.as_deref())?;
        Ok(Crew::new(
            domain,
            config,
            self.runtime.clone(),
            self.toolkit.registry_for(domain),
            self.output_root.join(domain.as_str()),
        ))
    }
}
