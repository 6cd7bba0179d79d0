//! Completion request and response types

use crate::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Request for LLM completion with full conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Conversation history
    pub messages: Vec<Message>,

    /// Optional system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Tools available for the LLM to call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Response from LLM completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated message from the assistant
    pub message: Message,

    pub stop_reason: StopReason,

    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Plain text answer, for tests and fakes
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// True when the model produced neither text nor tool calls
    pub fn is_blank(&self) -> bool {
        !self.message.has_tool_uses() && self.message.full_text().trim().is_empty()
    }
}

/// Reason the LLM stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural completion (end of turn)
    EndTurn,

    /// Hit max tokens limit
    MaxTokens,

    /// Stop sequence encountered
    StopSequence,

    /// Tool use requested
    ToolUse,
}

/// Token counts reported by the provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl CompletionRequest {
    /// Create a builder for completion requests
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }
}

/// Builder for CompletionRequest
pub struct CompletionRequestBuilder {
    model: String,
    messages: Vec<Message>,
    system: Option<String>,
    max_tokens: usize,
    temperature: Option<f32>,
    tools: Option<Vec<ToolDefinition>>,
}

impl CompletionRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            max_tokens: 4096,
            temperature: None,
            tools: None,
        }
    }

    /// Set the conversation messages
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Add a single message
    pub fn add_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the maximum tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the available tools; an empty list clears them
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Build the completion request
    pub fn build(self) -> CompletionRequest {
        CompletionRequest {
            model: self.model,
            messages: self.messages,
            system: self.system,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools: self.tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentBlock, MessageContent, Role};
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = CompletionRequest::builder("gpt-4.1-mini")
            .add_message(Message::user("Hello"))
            .system("You are a market analyst")
            .max_tokens(2048)
            .temperature(0.2)
            .tools(vec![])
            .build();

        assert_eq!(request.model, "gpt-4.1-mini");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.tools.is_none());
    }

    #[test]
    fn test_blank_detection() {
        assert!(CompletionResponse::text("").is_blank());
        assert!(CompletionResponse::text("  \n\t").is_blank());
        assert!(!CompletionResponse::text("BUY").is_blank());
    }

    #[test]
    fn test_tool_call_is_not_blank() {
        let response = CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: "call_9".to_string(),
                    name: "web_search".to_string(),
                    input: json!({"query": "ETF flows"}),
                }])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };
        assert!(!response.is_blank());
    }
}
