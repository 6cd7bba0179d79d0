//! Tool definition types for LLM tool use

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition for LLM provider
///
/// This describes a tool that the LLM can use, including its name,
/// description, and input schema in JSON Schema format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the tool in ToolRegistry)
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_serializes_schema() {
        let schema = json!({
            "type": "object",
            "properties": {"symbol": {"type": "string", "description": "Crypto symbol"}},
            "required": ["symbol"],
        });

        let tool = ToolDefinition::new("coinmarketcap_info", "Latest quote", schema.clone());
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["name"], "coinmarketcap_info");
        assert_eq!(value["input_schema"], schema);
        assert_eq!(value["input_schema"]["required"][0], "symbol");
    }
}
