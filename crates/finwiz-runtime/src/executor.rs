//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the tool-calling loop:
//! 1. Call the LLM with the conversation and the available tools
//! 2. If it asks for tools, run them and append their output
//! 3. Otherwise return its text
//!
//! When the iteration budget runs out the model gets one last call without
//! tools and is asked for its final answer.

use finwiz_core::Result;
use finwiz_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, ToolDefinition,
};
use finwiz_tools::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const FINAL_ANSWER_PROMPT: &str = "You have used all available tool calls. \
Using only the information gathered so far, give your best complete final answer now.";

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of LLM round trips that may request tools
    pub max_iterations: usize,

    pub model: String,

    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            model: "gpt-4.1-mini".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.2),
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Execute the agent loop for one user message
    pub async fn run(&self, user_message: String) -> Result<String> {
        let mut conversation = vec![Message::user(user_message)];
        let tools = self.build_tool_definitions();

        for iteration in 1..=self.config.max_iterations {
            debug!(
                iteration,
                max_iterations = self.config.max_iterations,
                tool_count = tools.len(),
                "Agent iteration started"
            );

            let response = self.complete(&conversation, tools.clone()).await?;
            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let wants_tools = response.message.has_tool_uses();
            conversation.push(response.message.clone());

            if !wants_tools {
                if response.stop_reason == StopReason::MaxTokens {
                    warn!("LLM response hit the token limit; returning truncated text");
                }
                return Ok(response.message.full_text());
            }

            let results = self.execute_tools(&response.message).await;
            conversation.extend(results);
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Iteration budget exhausted, requesting final answer"
        );
        conversation.push(Message::user(FINAL_ANSWER_PROMPT));
        let response = self.complete(&conversation, Vec::new()).await?;
        Ok(response.message.full_text())
    }

    async fn complete(
        &self,
        conversation: &[Message],
        tools: Vec<ToolDefinition>,
    ) -> Result<finwiz_llm::CompletionResponse> {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation.to_vec())
            .max_tokens(self.config.max_tokens)
            .tools(tools);
        if let Some(system) = &self.config.system_prompt {
            builder = builder.system(system.clone());
        }
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }

        Ok(self.provider.complete(builder.build()).await?)
    }

    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Run every tool call in `message`; results, including failures, come
    /// back as tool result messages.
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            let input_preview: String = input.to_string().chars().take(300).collect();
            info!(tool_name = %name, tool_id = %id, input_preview = %input_preview, "Executing tool");

            let started = Instant::now();
            let output = self.tool_registry.invoke(name, input.clone()).await;
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            if output.starts_with("Error:") {
                debug!(tool_name = %name, duration_ms, "Tool returned an error message");
                results.push(Message::tool_error(id.clone(), output));
            } else {
                debug!(tool_name = %name, duration_ms, result_length = output.len(), "Tool succeeded");
                results.push(Message::tool_result(id.clone(), output));
            }
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the executor; fails if no provider was set
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            finwiz_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finwiz_llm::{CompletionResponse, LLMError, MessageContent, Role, TokenUsage};
    use finwiz_tools::Tool;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Replays canned responses and records every request it sees.
    struct ScriptedProvider {
        responses: Mutex<Vec<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<CompletionResponse>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> finwiz_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| LLMError::RequestFailed("no more responses".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct PriceTool;

    #[async_trait]
    impl Tool for PriceTool {
        async fn execute(&self, params: Value) -> finwiz_core::Result<Value> {
            match params["symbol"].as_str() {
                Some("BTC") => Ok(json!("BTC: 64000 USD")),
                _ => Err(finwiz_core::Error::tool("price", "unknown symbol")),
            }
        }

        fn name(&self) -> &str {
            "price"
        }

        fn description(&self) -> &str {
            "Latest price for a symbol"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"symbol": {"type": "string"}}})
        }
    }

    fn tool_call(id: &str, symbol: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: "price".to_string(),
                    input: json!({"symbol": symbol}),
                }])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn executor(provider: Arc<ScriptedProvider>, max_iterations: usize) -> AgentExecutor {
        let registry = Arc::new(ToolRegistry::from_tools([Arc::new(PriceTool) as Arc<dyn Tool>]));
        AgentExecutorBuilder::new()
            .provider(provider)
            .tool_registry(registry)
            .system_prompt("You are a crypto analyst")
            .max_iterations(max_iterations)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(AgentExecutorBuilder::new().build().is_err());
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = ScriptedProvider::new(vec![CompletionResponse::text("Hold BTC")]);
        let answer = executor(provider.clone(), 3).run("Advice?".to_string()).await.unwrap();

        assert_eq!(answer, "Hold BTC");
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are a crypto analyst"));
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_tool_results_and_errors_are_fed_back() {
        let provider = ScriptedProvider::new(vec![
            tool_call("call_1", "BTC"),
            tool_call("call_2", "???"),
            CompletionResponse::text("BTC trades at 64000"),
        ]);
        let answer = executor(provider.clone(), 5).run("Price?".to_string()).await.unwrap();
        assert_eq!(answer, "BTC trades at 64000");

        let last = provider.requests().pop().unwrap();
        let tool_messages: Vec<_> = last
            .messages
            .iter()
            .filter_map(|m| match &m.content {
                Some(MessageContent::Blocks(blocks)) => match &blocks[0] {
                    ContentBlock::ToolResult { content, is_error, .. } => {
                        Some((content.clone(), *is_error))
                    }
                    _ => None,
                },
                _ => None,
            })
            .collect();

        assert_eq!(tool_messages.len(), 2);
        assert_eq!(tool_messages[0], ("BTC: 64000 USD".to_string(), None));
        assert!(tool_messages[1].0.starts_with("Error: Tool 'price' failed"));
        assert_eq!(tool_messages[1].1, Some(true));
    }

    #[tokio::test]
    async fn test_iteration_budget_forces_final_answer() {
        let provider = ScriptedProvider::new(vec![
            tool_call("call_1", "BTC"),
            tool_call("call_2", "BTC"),
            CompletionResponse::text("Final: accumulate"),
        ]);
        let answer = executor(provider.clone(), 2).run("Plan?".to_string()).await.unwrap();

        assert_eq!(answer, "Final: accumulate");
        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].tools.is_none());
        assert_eq!(
            requests[2].messages.last().and_then(Message::text),
            Some(FINAL_ANSWER_PROMPT)
        );
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedProvider::new(vec![]);
        let result = executor(provider, 2).run("Anything".to_string()).await;
        assert!(matches!(result, Err(finwiz_core::Error::ProcessingFailed(_))));
    }
}
