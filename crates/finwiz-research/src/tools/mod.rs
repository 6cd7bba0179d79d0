//! Research tools for crew agents
//!
//! Each tool wraps one upstream call or local file operation. Upstream
//! failures come back as [`finwiz_core::Error::ToolFailed`], which the tool
//! registry hands to the model as an `Error: ...` string.

pub mod alpha_vantage;
pub mod coinmarketcap;
pub mod directory;
pub mod json_output;
pub mod json_parser;
pub mod knowledge;
pub mod kraken;
pub mod web;
pub mod yahoo;

pub use alpha_vantage::{CompanyOverviewTool, EtfHoldingsTool};
pub use coinmarketcap::{
    CoinMarketCapHistoricalTool, CoinMarketCapInfoTool, CoinMarketCapListTool,
    CoinMarketCapNewsTool,
};
pub use directory::DirectoryReadTool;
pub use json_output::JsonOutputTool;
pub use json_parser::JsonParserTool;
pub use knowledge::{QueryKnowledgeTool, SaveKnowledgeTool};
pub use kraken::KrakenTickerTool;
pub use web::{FirecrawlScrapeTool, FirecrawlSearchTool, WebSearchTool};
pub use yahoo::{YahooHistoryTool, YahooNewsTool, YahooTickerInfoTool};

use crate::error::ResearchError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize tool parameters, naming the tool on failure
pub(crate) fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> finwiz_core::Result<T> {
    serde_json::from_value(params)
        .map_err(|e| finwiz_core::Error::tool(tool, format!("Invalid parameters: {e}")))
}

/// Attribute a research error to the tool that hit it
pub(crate) fn tool_error(tool: &str, err: ResearchError) -> finwiz_core::Error {
    tracing::warn!(tool, error = %err, "Tool call failed");
    finwiz_core::Error::tool(tool, err.to_string())
}
