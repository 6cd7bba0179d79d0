//! Knowledge collection query and save tools

use crate::knowledge::KnowledgeStore;
use async_trait::async_trait;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct QueryParams {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

/// Retrieve stored passages from one collection
pub struct QueryKnowledgeTool {
    store: KnowledgeStore,
    collection: String,
}

impl QueryKnowledgeTool {
    pub const NAME: &'static str = "query_knowledge";

    pub fn new(store: KnowledgeStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Tool for QueryKnowledgeTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: QueryParams = super::parse_params(Self::NAME, params)?;
        let hits = self
            .store
            .query(&self.collection, &params.query, params.limit)
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?;

        if hits.is_empty() {
            return Ok(json!(format!(
                "No relevant knowledge found in {} for '{}'.",
                self.collection, params.query
            )));
        }

        let mut out = String::new();
        for (i, hit) in hits.iter().enumerate() {
            let date = hit.entry.created_at.format("%Y-%m-%d");
            match &hit.entry.source {
                Some(source) => out.push_str(&format!("[{}] ({date}, {source})\n", i + 1)),
                None => out.push_str(&format!("[{}] ({date})\n", i + 1)),
            }
            out.push_str(hit.entry.text.trim());
            out.push_str("\n\n");
        }
        Ok(json!(out.trim_end()))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search the crew's knowledge base for previously stored research and market data."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "What to look up"},
                "limit": {"type": "integer", "default": 5}
            },
            "required": ["query"]
        })
    }
}

#[derive(Debug, Deserialize)]
struct SaveParams {
    text: String,
    #[serde(default)]
    source: Option<String>,
}

/// Persist a passage so later runs can retrieve it
pub struct SaveKnowledgeTool {
    store: KnowledgeStore,
    collection: String,
}

impl SaveKnowledgeTool {
    pub const NAME: &'static str = "save_to_knowledge";

    pub fn new(store: KnowledgeStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Tool for SaveKnowledgeTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SaveParams = super::parse_params(Self::NAME, params)?;
        self.store
            .save(&self.collection, &params.text, params.source.as_deref())
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?;
        Ok(json!("stored"))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Persist text in the crew's knowledge base so it can be retrieved later."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to store"},
                "source": {"type": "string", "description": "Optional origin of the text"}
            },
            "required": ["text"]
        })
    }
}
