//! Tool trait definition

use async_trait::async_trait;
use finwiz_core::Result;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool provides a name, a description the model reads to decide when
/// to call it, and a JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with parameters matching [`Tool::input_schema`]
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique name within a registry
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Input schema (JSON Schema format)
    fn input_schema(&self) -> Value;
}

/// Render a tool's JSON output as the text handed back to the model.
///
/// Strings are passed through untouched so tools can return pre-formatted
/// markdown; anything else is pretty-printed.
pub fn render_output(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_string_verbatim() {
        let text = "| Name | Price |\n|---|---|";
        assert_eq!(render_output(&json!(text)), text);
    }

    #[test]
    fn test_render_object_pretty() {
        let rendered = render_output(&json!({"symbol": "BTC"}));
        assert!(rendered.contains("\"symbol\": \"BTC\""));
        assert!(rendered.contains('\n'));
    }
}
