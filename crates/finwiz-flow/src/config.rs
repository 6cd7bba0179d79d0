//! Flow settings

use crate::error::{FlowError, Result};
use std::path::PathBuf;

/// Environment variable overriding the stage cache directory
pub const REPORT_DIR_VAR: &str = "FINWIZ_REPORT_DIR";

/// Where stage results are cached and whether to reuse them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub cache_dir: PathBuf,
    /// Run every stage even when its cache file exists
    pub fresh: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("output").join("report"),
            fresh: false,
        }
    }
}

impl FlowConfig {
    pub fn builder() -> FlowConfigBuilder {
        FlowConfigBuilder::default()
    }

    /// Defaults with the cache directory taken from `FINWIZ_REPORT_DIR`
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(dir) = std::env::var(REPORT_DIR_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            builder = builder.cache_dir(dir);
        }
        builder.build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(FlowError::Config("cache_dir must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for FlowConfig
#[derive(Debug, Default)]
pub struct FlowConfigBuilder {
    cache_dir: Option<PathBuf>,
    fresh: bool,
}

impl FlowConfigBuilder {
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    pub fn build(self) -> Result<FlowConfig> {
        let config = FlowConfig {
            cache_dir: self.cache_dir.unwrap_or_else(|| FlowConfig::default().cache_dir),
            fresh: self.fresh,
        };
        config.validate()?;
        Ok(config)
    }
}
