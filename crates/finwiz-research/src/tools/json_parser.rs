//! Extract tickers, recommendations and allocations from crew JSON documents

use super::json_output::DEFAULT_CURRENCY;
use crate::format::number;
use async_trait::async_trait;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;

/// What to pull out of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    All,
    Tickers,
    Recommendations,
    Allocation,
    Summary,
}

impl FromStr for Extraction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "tickers" => Ok(Self::Tickers),
            "recommendations" => Ok(Self::Recommendations),
            "allocation" | "allocations" => Ok(Self::Allocation),
            "summary" => Ok(Self::Summary),
            other => Err(format!(
                "Unknown extraction_type '{other}'. Use all, tickers, recommendations, allocation or summary"
            )),
        }
    }
}

fn recommendations(data: &Value) -> &[Value] {
    data.get("recommendations")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn array_len(data: &Value, key: &str) -> usize {
    data.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

/// Apply an extraction to a parsed document
pub fn extract(data: Value, extraction: Extraction) -> Value {
    match extraction {
        Extraction::All => data,
        Extraction::Tickers => {
            let mut tickers: Vec<Value> = Vec::new();
            let analyzed = data
                .get("tickers_analyzed")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let recommended = recommendations(&data).iter().filter_map(|rec| rec.get("ticker"));
            for ticker in analyzed.iter().chain(recommended) {
                if !tickers.contains(ticker) {
                    tickers.push(ticker.clone());
                }
            }
            json!({ "tickers": tickers })
        }
        Extraction::Recommendations => json!({ "recommendations": recommendations(&data) }),
        Extraction::Allocation => {
            let allocations: Vec<Value> = recommendations(&data)
                .iter()
                .filter_map(|rec| {
                    let ticker = rec.get("ticker")?;
                    let allocation = rec.get("allocation")?;
                    Some(json!({
                        "ticker": ticker,
                        "allocation": allocation,
                        "currency": rec.get("currency").cloned().unwrap_or(json!(DEFAULT_CURRENCY)),
                    }))
                })
                .collect();
            json!({ "allocations": allocations })
        }
        Extraction::Summary => {
            let total_allocation: f64 = recommendations(&data)
                .iter()
                .filter_map(|rec| rec.get("allocation").and_then(number))
                .sum();
            json!({
                "crew_type": data.get("crew_type").cloned().unwrap_or(json!("unknown")),
                "analysis_date": data.get("analysis_date").cloned().unwrap_or(json!("")),
                "total_tickers_analyzed": array_len(&data, "tickers_analyzed"),
                "total_recommendations": array_len(&data, "recommendations"),
                "total_allocation": total_allocation,
                "currency": data.get("currency").cloned().unwrap_or(json!(DEFAULT_CURRENCY)),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParserParams {
    #[serde(default)]
    json_content: Option<String>,
    #[serde(default)]
    json_file_path: Option<String>,
    #[serde(default)]
    extraction_type: Option<String>,
}

/// Parses crew JSON documents for the report crew
#[derive(Debug, Default)]
pub struct JsonParserTool;

impl JsonParserTool {
    pub const NAME: &'static str = "json_parser";

    pub fn new() -> Self {
        Self
    }

    async fn load(params: &ParserParams) -> std::result::Result<Value, String> {
        let content = params.json_content.as_deref().filter(|c| !c.trim().is_empty());
        let path = params.json_file_path.as_deref().filter(|p| !p.trim().is_empty());

        match (content, path) {
            (Some(content), _) => {
                serde_json::from_str(content).map_err(|_| "Invalid JSON content provided".to_string())
            }
            (None, Some(path)) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|_| format!("File not found: {path}"))?;
                serde_json::from_str(&text).map_err(|_| format!("Invalid JSON file: {path}"))
            }
            (None, None) => Err("Either json_content or json_file_path must be provided".to_string()),
        }
    }
}

#[async_trait]
impl Tool for JsonParserTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: ParserParams = super::parse_params(Self::NAME, params)?;
        let extraction: Extraction = params
            .extraction_type
            .as_deref()
            .unwrap_or("all")
            .parse()
            .map_err(|e: String| finwiz_core::Error::tool(Self::NAME, e))?;

        let data = Self::load(&params)
            .await
            .map_err(|e| finwiz_core::Error::tool(Self::NAME, e))?;
        Ok(extract(data, extraction))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Extracts structured information from crew JSON output: ticker symbols, \
         recommendations, allocation details or a summary."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "json_content": {"type": "string", "description": "JSON content to parse"},
                "json_file_path": {"type": "string", "description": "Path to a JSON file"},
                "extraction_type": {
                    "type": "string",
                    "enum": ["all", "tickers", "recommendations", "allocation", "summary"],
                    "default": "all"
                }
            }
        })
    }
}
