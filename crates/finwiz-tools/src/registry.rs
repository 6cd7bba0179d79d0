//! Tool registry for managing available tools

use crate::{Tool, render_output};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Registry for managing tools, iterated in name order
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of tools
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        let registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if tools.insert(tool.name().to_string(), tool).is_some() {
            debug!("Replaced an already registered tool");
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// List all registered tools
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().cloned().collect()
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.keys().cloned().collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run a tool by name and return its output as text.
    ///
    /// Unknown tools and tool failures come back as `Error: ...` strings
    /// rather than errors.
    pub async fn invoke(&self, name: &str, params: Value) -> String {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "Model requested an unknown tool");
            return format!(
                "Error: tool '{name}' is not available. Available tools: {}",
                self.names().join(", ")
            );
        };

        match tool.execute(params).await {
            Ok(output) => render_output(&output),
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                format!("Error: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(&self, params: Value) -> finwiz_core::Result<Value> {
            Ok(params)
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Returns its input"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        async fn execute(&self, _params: Value) -> finwiz_core::Result<Value> {
            Err(finwiz_core::Error::tool("broken", "HTTP 503 from upstream"))
        }

        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    #[test]
    fn test_register_and_list_sorted() {
        let registry = ToolRegistry::from_tools([
            Arc::new(EchoTool) as Arc<dyn Tool>,
            Arc::new(BrokenTool) as Arc<dyn Tool>,
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["broken", "echo"]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_invoke_renders_output() {
        let registry = ToolRegistry::from_tools([Arc::new(EchoTool) as Arc<dyn Tool>]);
        assert_eq!(registry.invoke("echo", json!("plain text")).await, "plain text");
        assert!(registry.invoke("echo", json!({"a": 1})).await.contains("\"a\": 1"));
    }

    #[tokio::test]
    async fn test_invoke_turns_failures_into_text() {
        let registry = ToolRegistry::from_tools([
            Arc::new(EchoTool) as Arc<dyn Tool>,
            Arc::new(BrokenTool) as Arc<dyn Tool>,
        ]);

        let failed = registry.invoke("broken", json!({})).await;
        assert_eq!(failed, "Error: Tool 'broken' failed: HTTP 503 from upstream");

        let unknown = registry.invoke("nope", json!({})).await;
        assert!(unknown.starts_with("Error: tool 'nope' is not available"));
        assert!(unknown.contains("broken, echo"));
    }
}
