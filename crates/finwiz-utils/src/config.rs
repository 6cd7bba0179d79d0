//! Application settings gathered from the environment

use crate::error::Result;
use crate::logging::LogConfig;
use finwiz_flow::FlowConfig;
use finwiz_llm::RetryPolicy;
use finwiz_llm::providers::OpenAIConfig;
use finwiz_research::ResearchConfig;
use std::path::PathBuf;

pub const MODEL_VAR: &str = "FINWIZ_MODEL";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Load `.env` from the working directory or its parents.
///
/// Returns the file that was loaded. Variables already set win.
pub fn load_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Everything a FinWiz run is configured with
#[derive(Debug, Clone)]
pub struct Settings {
    pub model: String,
    /// `None` when `OPENAI_API_KEY` is unset
    pub openai: Option<OpenAIConfig>,
    pub retry: RetryPolicy,
    pub research: ResearchConfig,
    pub flow: FlowConfig,
    pub logging: LogConfig,
}

impl Settings {
    /// Read every section from the environment; call [`load_env`] first
    pub fn from_env() -> Result<Self> {
        let model = std::env::var(MODEL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            model,
            openai: OpenAIConfig::from_env().ok(),
            retry: RetryPolicy::default(),
            research: ResearchConfig::from_env()?,
            flow: FlowConfig::from_env()?,
            logging: LogConfig::from_env(),
        })
    }

    /// The OpenAI settings, or a configuration error naming the missing key
    pub fn require_openai(&self) -> Result<&OpenAIConfig> {
        self.openai.as_ref().ok_or_else(|| {
            finwiz_llm::LLMError::ConfigurationError(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
            .into()
        })
    }
}
