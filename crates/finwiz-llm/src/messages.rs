//! Message types for LLM communication

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// System message (sent in-band for OpenAI-style APIs)
    System,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text { text: String },

    /// Tool use request from the assistant
    ToolUse {
        /// Unique ID for this tool use
        id: String,
        /// Tool name
        name: String,
        /// Tool input parameters (JSON)
        input: serde_json::Value,
    },

    /// Tool output handed back to the model
    ToolResult {
        /// ID of the tool use this is responding to
        tool_use_id: String,
        /// Result content
        content: String,
        /// Whether this is an error result
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create a user message carrying one tool result
    pub fn tool_result(tool_use_id: String, result: String) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id,
                content: result,
                is_error: None,
            }])),
        }
    }

    /// Create a user message carrying one failed tool result
    pub fn tool_error(tool_use_id: String, error: String) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id,
                content: error,
                is_error: Some(true),
            }])),
        }
    }

    /// First text block of the message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            None => None,
        }
    }

    /// All text blocks joined with newlines
    pub fn full_text(&self) -> String {
        match &self.content {
            Some(MessageContent::Text(s)) => s.clone(),
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }

    /// Extract tool use requests from assistant messages
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
                .collect(),
            _ => vec![],
        }
    }

    /// Check if this message contains any tool uses
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Analyse NVDA");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Analyse NVDA"));
    }

    #[test]
    fn test_tool_error_is_flagged() {
        let msg = Message::tool_error("call_1".to_string(), "Error: timeout".to_string());
        match msg.content {
            Some(MessageContent::Blocks(blocks)) => {
                assert!(matches!(
                    &blocks[0],
                    ContentBlock::ToolResult { is_error: Some(true), .. }
                ));
            }
            _ => panic!("Expected blocks"),
        }
    }

    #[test]
    fn test_full_text_skips_tool_blocks() {
        let msg = Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![
                ContentBlock::Text {
                    text: "Looking up".to_string(),
                },
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "kraken_ticker".to_string(),
                    input: json!({"pair": "XBTUSD"}),
                },
                ContentBlock::Text {
                    text: "the price".to_string(),
                },
            ])),
        };

        assert_eq!(msg.full_text(), "Looking up\nthe price");
        assert!(msg.has_tool_uses());
        assert_eq!(msg.tool_uses().len(), 1);
    }

    #[test]
    fn test_empty_message_has_no_text() {
        let msg = Message {
            role: Role::Assistant,
            content: None,
        };
        assert_eq!(msg.text(), None);
        assert_eq!(msg.full_text(), "");
    }
}
