//! OpenAI-compatible chat completions provider
//!
//! Works against api.openai.com as well as any server that speaks the
//! `/chat/completions` protocol (LM Studio, vLLM, Azure deployments).
//!
//! ```no_run
//! use finwiz_llm::{CompletionRequest, LLMProvider, Message};
//! use finwiz_llm::providers::OpenAIProvider;
//!
//! # async fn run() -> finwiz_llm::Result<()> {
//! let provider = OpenAIProvider::from_env()?;
//! let request = CompletionRequest::builder("gpt-4.1-mini")
//!     .add_message(Message::user("Which sectors led the S&P 500 this week?"))
//!     .build();
//! let response = provider.complete(request).await?;
//! println!("{}", response.message.full_text());
//! # Ok(())
//! # }
//! ```

use crate::{
    BlockingLLMProvider, CompletionRequest, CompletionResponse, ContentBlock, LLMError,
    LLMProvider, Message, MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL, without the `/chat/completions` suffix
    pub api_base: String,

    /// Request timeout in seconds (default: 300)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read `OPENAI_API_KEY` and, if set, `OPENAI_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Ok(Self::new(api_key).with_api_base(api_base))
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Async OpenAI provider
pub struct OpenAIProvider {
    client: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Create a provider from `OPENAI_API_KEY` / `OPENAI_API_BASE`
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.clone();
        let body = build_request(request);

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(status_error(status, error_text, model));
        }

        let payload: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        parse_response(payload)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Blocking OpenAI provider.
///
/// Must be built and used outside of an async runtime.
pub struct OpenAIBlockingProvider {
    client: reqwest::blocking::Client,
    config: OpenAIConfig,
}

impl OpenAIBlockingProvider {
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }
}

impl BlockingLLMProvider for OpenAIBlockingProvider {
    fn complete_blocking(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.clone();
        debug!(model = %model, api_base = %self.config.api_base, "Sending blocking completion");
        let body = build_request(request);

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text()?;
            return Err(status_error(status, error_text, model));
        }

        let payload: OpenAIResponse = response
            .json()
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        parse_response(payload)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn status_error(status: StatusCode, error_text: String, model: String) -> LLMError {
    match status.as_u16() {
        401 => LLMError::AuthenticationFailed,
        429 => LLMError::RateLimitExceeded(error_text),
        400 => LLMError::InvalidRequest(error_text),
        404 => LLMError::ModelNotFound(model),
        _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAIMessage {
    fn plain(role: &'static str, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseToolCall {
    id: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion
// ============================================================================

fn build_request(request: CompletionRequest) -> OpenAIRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system {
        messages.push(OpenAIMessage::plain("system", system));
    }
    for msg in request.messages {
        messages.extend(convert_message(msg));
    }

    OpenAIRequest {
        model: request.model,
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools: request.tools.as_deref().map(convert_tools),
    }
}

/// One of our messages may become several OpenAI messages: each tool result
/// is sent as its own `tool` message.
fn convert_message(msg: Message) -> Vec<OpenAIMessage> {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    };

    let blocks = match msg.content {
        Some(MessageContent::Text(text)) => return vec![OpenAIMessage::plain(role, text)],
        None => return vec![OpenAIMessage::plain(role, String::new())],
        Some(MessageContent::Blocks(blocks)) => blocks,
    };

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    let mut tool_results = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(OpenAIToolCall {
                id,
                tool_type: "function",
                function: OpenAIFunctionCall {
                    name,
                    arguments: input.to_string(),
                },
            }),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => tool_results.push(OpenAIMessage {
                role: "tool",
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(tool_use_id),
            }),
        }
    }

    let mut out = Vec::new();
    if !texts.is_empty() || !tool_calls.is_empty() {
        out.push(OpenAIMessage {
            role,
            content: (!texts.is_empty()).then(|| texts.join("\n")),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
        });
    }
    out.extend(tool_results);
    out
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<OpenAITool> {
    tools
        .iter()
        .map(|tool| OpenAITool {
            tool_type: "function",
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn parse_response(payload: OpenAIResponse) -> Result<CompletionResponse> {
    let usage = payload
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    let choice = payload
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    let finish_reason = choice.finish_reason.unwrap_or_default();
    debug!(
        finish_reason = %finish_reason,
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "Received completion"
    );

    let mut blocks = Vec::new();
    if let Some(content) = choice.message.content.filter(|c| !c.is_empty()) {
        blocks.push(ContentBlock::Text { text: content });
    }
    for call in choice.message.tool_calls.unwrap_or_default() {
        let input = serde_json::from_str(&call.function.arguments).map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}"))
        })?;
        blocks.push(ContentBlock::ToolUse {
            id: call.id,
            name: call.function.name,
            input,
        });
    }

    Ok(CompletionResponse {
        message: Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
        },
        stop_reason: map_stop_reason(&finish_reason),
        usage,
    })
}

fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "stop" => StopReason::EndTurn,
        other => {
            debug!(reason = other, "Treating unknown finish reason as end of turn");
            StopReason::EndTurn
        }
    }
}
