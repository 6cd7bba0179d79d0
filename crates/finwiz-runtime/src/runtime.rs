//! Runtime for constructing agents around a shared LLM provider

use finwiz_core::Result;
use finwiz_llm::LLMProvider;
use finwiz_tools::ToolRegistry;
use std::sync::Arc;

use crate::agents::ToolAgent;
use crate::executor::{AgentExecutor, ExecutorConfig};

/// Defaults applied to every agent the runtime builds
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub default_max_iterations: usize,
    pub default_model: String,
    pub default_max_tokens: usize,
    pub default_temperature: Option<f32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            default_max_iterations: executor.max_iterations,
            default_model: executor.model,
            default_max_tokens: executor.max_tokens,
            default_temperature: executor.temperature,
        }
    }
}

/// Holds the LLM provider and hands it to the agents it creates
///
/// # Example
///
/// ```no_run
/// use finwiz_runtime::AgentRuntime;
/// use finwiz_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// # fn example(provider: Arc<dyn finwiz_llm::LLMProvider>) -> finwiz_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .default_model("gpt-4.1-mini")
///     .build()?;
///
/// let analyst = runtime.create_tool_agent(
///     runtime.executor_config("You are a market analyst"),
///     "market_analyst",
///     Arc::new(ToolRegistry::new()),
/// );
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self { provider, config }
    }

    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Executor settings from the runtime defaults plus a system prompt
    pub fn executor_config(&self, system_prompt: impl Into<String>) -> ExecutorConfig {
        ExecutorConfig {
            max_iterations: self.config.default_max_iterations,
            model: self.config.default_model.clone(),
            system_prompt: Some(system_prompt.into()),
            max_tokens: self.config.default_max_tokens,
            temperature: self.config.default_temperature,
        }
    }

    /// Create a tool-using agent that sees only `tools`
    pub fn create_tool_agent(
        &self,
        config: ExecutorConfig,
        name: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> ToolAgent {
        let executor = AgentExecutor::new(self.provider.clone(), tools, config);
        ToolAgent::new(executor, name)
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_max_iterations(mut self, max: usize) -> Self {
        self.config.default_max_iterations = max;
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Build the runtime; fails if no provider was set
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self.provider.ok_or_else(|| {
            finwiz_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentRuntime::new(provider, self.config))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finwiz_core::{Agent, Context};
    use finwiz_llm::{CompletionRequest, CompletionResponse};

    struct EchoProvider;

    #[async_trait::async_trait]
    impl LLMProvider for EchoProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> finwiz_llm::Result<CompletionResponse> {
            let model = request.model.clone();
            let system = request.system.unwrap_or_default();
            Ok(CompletionResponse::text(format!("{model}|{system}")))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_runtime_builder_defaults() {
        let builder = AgentRuntimeBuilder::new()
            .default_max_iterations(5)
            .default_model("test-model");

        assert_eq!(builder.config.default_max_iterations, 5);
        assert_eq!(builder.config.default_model, "test-model");
        assert!(builder.build().is_err());
    }

    #[tokio::test]
    async fn test_tool_agent_uses_runtime_defaults() {
        let runtime = AgentRuntime::builder()
            .provider(Arc::new(EchoProvider))
            .default_model("local-model")
            .build()
            .unwrap();

        let agent = runtime.create_tool_agent(
            runtime.executor_config("You are a portfolio allocator"),
            "portfolio_allocator",
            Arc::new(ToolRegistry::new()),
        );

        assert_eq!(agent.name(), "portfolio_allocator");
        let output = agent
            .process("Allocate 1000 CHF".to_string(), &mut Context::new())
            .await
            .unwrap();
        assert_eq!(output, "local-model|You are a portfolio allocator");
    }
}
