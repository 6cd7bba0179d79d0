//! Alpha Vantage company overview and ETF holdings tools

use crate::api::AlphaVantageClient;
use crate::cache::{CacheKey, ResponseCache};
use crate::error::ResearchError;
use crate::format::number;
use async_trait::async_trait;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Deserialize)]
struct TickerParams {
    ticker: String,
}

fn ticker_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "ticker": {"type": "string", "description": description}
        },
        "required": ["ticker"]
    })
}

/// Fundamentals and company profile from `OVERVIEW`
pub struct CompanyOverviewTool {
    client: AlphaVantageClient,
    cache: ResponseCache,
}

impl CompanyOverviewTool {
    pub const NAME: &'static str = "alpha_vantage_company_overview";

    pub fn new(client: AlphaVantageClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for CompanyOverviewTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: TickerParams = super::parse_params(Self::NAME, params)?;
        let symbol = params.ticker.trim().to_uppercase();

        self.cache
            .get_or_fetch(CacheKey::new("alpha_vantage", "overview", &json!(symbol)), || async {
                let overview = self.client.company_overview(&symbol).await?;
                Ok::<_, ResearchError>(overview.unwrap_or_else(|| {
                    json!(format!(
                        "No data found for ticker {symbol}. It might be an invalid symbol."
                    ))
                }))
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Fetch fundamental data and a company overview for a stock ticker from \
         Alpha Vantage: market cap, P/E ratio, EPS, margins, sector and more."
    }

    fn input_schema(&self) -> Value {
        ticker_schema("Stock ticker symbol, e.g. 'IBM'")
    }
}

/// Reduce an `ETF_PROFILE` response to its top ten holdings and sector weights
pub fn summarize_etf_profile(symbol: &str, profile: &Value) -> Value {
    let mut out = Map::new();
    out.insert("symbol".to_string(), json!(symbol));

    for (from, to) in [
        ("net_assets", "net_assets"),
        ("net_expense_ratio", "expense_ratio"),
        ("dividend_yield", "dividend_yield"),
        ("inception_date", "inception_date"),
        ("portfolio_turnover", "portfolio_turnover"),
    ] {
        if let Some(value) = profile.get(from).filter(|v| !v.is_null() && v.as_str() != Some("n/a")) {
            out.insert(to.to_string(), value.clone());
        }
    }

    let holdings: Vec<Value> = profile
        .get("holdings")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(10)
                .map(|h| {
                    json!({
                        "symbol": h.get("symbol").cloned().unwrap_or(Value::Null),
                        "name": h.get("description").cloned().unwrap_or(Value::Null),
                        "weight": h.get("weight").and_then(number),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    if !holdings.is_empty() {
        out.insert("top_holdings".to_string(), Value::Array(holdings));
    }

    let sectors: Map<String, Value> = profile
        .get("sectors")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|s| {
                    let name = s.get("sector")?.as_str()?;
                    let weight = s.get("weight").and_then(number)?;
                    Some((name.to_string(), json!(weight)))
                })
                .collect()
        })
        .unwrap_or_default();
    if !sectors.is_empty() {
        out.insert("sector_breakdown".to_string(), Value::Object(sectors));
    }

    Value::Object(out)
}

/// Top holdings and sector breakdown of an ETF
pub struct EtfHoldingsTool {
    client: AlphaVantageClient,
    cache: ResponseCache,
}

impl EtfHoldingsTool {
    pub const NAME: &'static str = "etf_holdings";

    pub fn new(client: AlphaVantageClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for EtfHoldingsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: TickerParams = super::parse_params(Self::NAME, params)?;
        let symbol = params.ticker.trim().to_uppercase();

        self.cache
            .get_or_fetch(CacheKey::new("alpha_vantage", "etf_profile", &json!(symbol)), || async {
                let profile = self.client.etf_profile(&symbol).await?;
                Ok::<_, ResearchError>(match profile {
                    Some(profile) => summarize_etf_profile(&symbol, &profile),
                    None => json!(format!("No holdings data found for ETF {symbol}.")),
                })
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get the top ten holdings, sector allocation, expense ratio and net \
         assets of an ETF."
    }

    fn input_schema(&self) -> Value {
        ticker_schema("ETF ticker symbol, e.g. 'QQQ'")
    }
}
