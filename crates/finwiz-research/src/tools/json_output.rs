//! Standardized JSON recommendation documents

use async_trait::async_trait;
use chrono::Local;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::path::Path;

/// Default currency of a recommendation
pub const DEFAULT_CURRENCY: &str = "CHF";

fn standardize_recommendation(rec: Map<String, Value>) -> Value {
    let mut out = Map::new();
    let defaults = [
        ("ticker", json!("")),
        ("name", json!("")),
        ("action", json!("")),
        ("price", json!(0)),
        ("currency", json!(DEFAULT_CURRENCY)),
        ("allocation", json!(0)),
        ("rationale", json!("")),
        ("risk_level", json!("")),
        ("expected_return", json!("")),
        ("timeframe", json!("")),
    ];
    for (key, default) in defaults {
        out.insert(key.to_string(), rec.get(key).cloned().unwrap_or(default));
    }
    for (key, value) in rec {
        out.entry(key).or_insert(value);
    }
    Value::Object(out)
}

/// Fill in the fields every crew document shares.
///
/// Non-object recommendation entries are dropped.
pub fn standardize(data: Map<String, Value>) -> Map<String, Value> {
    let mut data = data;
    data.entry("crew_type").or_insert_with(|| json!(""));
    data.entry("analysis_date")
        .or_insert_with(|| json!(Local::now().format("%Y-%m-%d").to_string()));

    let recommendations: Vec<Value> = match data.remove("recommendations") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(rec) => Some(standardize_recommendation(rec)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    if !data.contains_key("tickers_analyzed") {
        let tickers: Vec<Value> = recommendations
            .iter()
            .filter_map(|rec| rec.get("ticker").and_then(Value::as_str))
            .filter(|t| !t.is_empty())
            .map(|t| json!(t))
            .collect();
        data.insert("tickers_analyzed".to_string(), Value::Array(tickers));
    }
    data.insert("recommendations".to_string(), Value::Array(recommendations));
    data
}

#[derive(Debug, Deserialize)]
struct OutputParams {
    data: Map<String, Value>,
    #[serde(default)]
    output_path: Option<String>,
}

/// Writes crew results in the shape the report crew reads
#[derive(Debug, Default)]
pub struct JsonOutputTool;

impl JsonOutputTool {
    pub const NAME: &'static str = "json_output";

    pub fn new() -> Self {
        Self
    }

    async fn save(path: &Path, body: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, body).await
    }
}

#[async_trait]
impl Tool for JsonOutputTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: OutputParams = super::parse_params(Self::NAME, params)?;
        let document = Value::Object(standardize(params.data));
        let body = serde_json::to_string_pretty(&document)
            .map_err(|e| finwiz_core::Error::tool(Self::NAME, e.to_string()))?;

        match params.output_path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => {
                Self::save(Path::new(path), &body)
                    .await
                    .map_err(|e| {
                        finwiz_core::Error::tool(Self::NAME, format!("Failed to write {path}: {e}"))
                    })?;
                tracing::info!(path, "Saved JSON output");
                Ok(json!(format!("JSON output saved to {path}")))
            }
            None => Ok(json!(body)),
        }
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Generates standardized JSON output from analysis data (crew_type, analysis_date, \
         recommendations, tickers_analyzed). Saves to output_path when given, otherwise \
         returns the JSON."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "object",
                    "description": "Analysis data with recommendations, tickers and analysis"
                },
                "output_path": {"type": "string", "description": "Optional file path"}
            },
            "required": ["data"]
        })
    }
}
