//! CoinMarketCap quote, listing, history and news tools

use crate::api::CoinMarketCapClient;
use crate::cache::{CacheKey, ResponseCache};
use crate::error::ResearchError;
use crate::format::{billions, grouped, millions, number};
use async_trait::async_trait;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};

/// Highest `limit` CoinMarketCap accepts for listings and news
pub const MAX_LIMIT: u32 = 100;

fn num(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(number).unwrap_or(0.0)
}

fn text<'a>(value: &'a Value, key: &str, default: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn usd(entry: &Value) -> &Value {
    &entry["quote"]["USD"]
}

fn capped(limit: u32, what: &str) -> u32 {
    if limit > MAX_LIMIT {
        tracing::warn!(requested = limit, "Limit capped at {MAX_LIMIT} {what}");
        MAX_LIMIT
    } else {
        limit.max(1)
    }
}

/// Map a requested sort onto a listings sort key, defaulting to market cap
pub fn sort_key(sort: &str) -> &'static str {
    match sort {
        "volume_24h" => "volume_24h",
        "price" => "price",
        "percent_change_24h" => "percent_change_24h",
        _ => "market_cap",
    }
}

/// Sampling interval for a history period
pub fn interval_for(time_period: &str) -> &'static str {
    match time_period {
        "24h" => "hourly",
        "1y" => "weekly",
        _ => "daily",
    }
}

fn title_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Markdown block for one coin from `/cryptocurrency/quotes/latest`
pub fn format_info(symbol: &str, response: &Value) -> String {
    let symbol = symbol.to_uppercase();
    let Some(coin) = response.get("data").and_then(|d| d.get(&symbol)) else {
        return format!("No data found for cryptocurrency symbol: {symbol}");
    };
    let quote = usd(coin);
    let ticker = text(coin, "symbol", &symbol);

    let mut out = format!("## {} ({ticker})\n\n", text(coin, "name", &symbol));
    out.push_str(&format!("**Current Price:** ${:.4} USD\n", num(quote, "price")));
    out.push_str(&format!("**Market Cap:** ${} USD\n", grouped(num(quote, "market_cap"))));
    out.push_str(&format!("**24h Volume:** ${} USD\n", grouped(num(quote, "volume_24h"))));
    out.push_str(&format!("**24h Change:** {:.2}%\n", num(quote, "percent_change_24h")));
    out.push_str(&format!("**7d Change:** {:.2}%\n", num(quote, "percent_change_7d")));
    out.push_str(&format!(
        "**Circulating Supply:** {} {ticker}\n",
        grouped(num(coin, "circulating_supply"))
    ));
    if let Some(max_supply) = coin.get("max_supply").and_then(number) {
        out.push_str(&format!("**Max Supply:** {} {ticker}\n", grouped(max_supply)));
    }
    let rank = coin
        .get("cmc_rank")
        .map_or_else(|| "N/A".to_string(), |r| r.to_string());
    out.push_str(&format!("**Market Cap Rank:** #{rank}\n"));
    out.push_str(&format!("**Last Updated:** {}\n\n", text(quote, "last_updated", "N/A")));

    if let Some(platform) = coin.get("platform").filter(|p| !p.is_null()) {
        out.push_str(&format!("**Token Platform:** {}\n", text(platform, "name", "N/A")));
    }
    if let Some(tags) = coin.get("tags").and_then(Value::as_array).filter(|t| !t.is_empty()) {
        let tags: Vec<&str> = tags.iter().filter_map(Value::as_str).take(5).collect();
        out.push_str(&format!("**Categories:** {}\n", tags.join(", ")));
    }
    out
}

/// Markdown table from `/cryptocurrency/listings/latest`
pub fn format_listing(limit: u32, sort: &str, response: &Value) -> String {
    let Some(coins) = response.get("data").and_then(Value::as_array) else {
        return "No cryptocurrency data found".to_string();
    };

    let mut out = format!("## Top {limit} Cryptocurrencies by {}\n\n", title_case(sort));
    out.push_str("| Rank | Name | Symbol | Price (USD) | 24h Change | Market Cap | 24h Volume |\n");
    out.push_str("|------|------|--------|------------|------------|------------|------------|\n");
    for coin in coins {
        let quote = usd(coin);
        let rank = coin
            .get("cmc_rank")
            .map_or_else(|| "N/A".to_string(), |r| r.to_string());
        out.push_str(&format!(
            "| {rank} | {} | {} | ${:.4} | {:.2}% | {} | {} |\n",
            text(coin, "name", "Unknown"),
            text(coin, "symbol", "N/A"),
            num(quote, "price"),
            num(quote, "percent_change_24h"),
            billions(num(quote, "market_cap")),
            millions(num(quote, "volume_24h")),
        ));
    }
    out
}

/// Markdown table from `/cryptocurrency/quotes/historical`
pub fn format_history(symbol: &str, time_period: &str, response: &Value) -> String {
    let Some(quotes) = response
        .get("data")
        .and_then(|d| d.get("quotes"))
        .and_then(Value::as_array)
    else {
        return format!("No historical data found for {symbol} over {time_period}");
    };

    let mut out = format!("## Historical Data for {symbol} over {time_period}\n\n");
    if interval_for(time_period) == "hourly" {
        out.push_str("| Date & Time | Price (USD) | Volume | Market Cap |\n");
        out.push_str("|-------------|-------------|--------|------------|\n");
        for entry in quotes {
            let quote = usd(entry);
            out.push_str(&format!(
                "| {} | ${:.4} | {} | {} |\n",
                text(entry, "timestamp", "N/A"),
                num(quote, "price"),
                millions(num(quote, "volume_24h")),
                billions(num(quote, "market_cap")),
            ));
        }
    } else {
        out.push_str("| Date | Price (USD) | 24h Change | Volume | Market Cap |\n");
        out.push_str("|------|-------------|------------|--------|------------|\n");
        for entry in quotes {
            let quote = usd(entry);
            let date = text(entry, "timestamp", "N/A")
                .split('T')
                .next()
                .unwrap_or("N/A");
            out.push_str(&format!(
                "| {date} | ${:.4} | {:.2}% | {} | {} |\n",
                num(quote, "price"),
                num(quote, "percent_change_24h"),
                millions(num(quote, "volume_24h")),
                billions(num(quote, "market_cap")),
            ));
        }
    }
    out
}

/// Markdown article list from `/content/latest`
pub fn format_news(symbol: Option<&str>, response: &Value) -> String {
    let Some(articles) = response.get("data").and_then(Value::as_array) else {
        return "No cryptocurrency news articles found".to_string();
    };

    let mut out = match symbol {
        Some(symbol) => format!("## Latest News for {symbol}\n\n"),
        None => "## Latest Cryptocurrency News\n\n".to_string(),
    };
    for article in articles {
        out.push_str(&format!("### {}\n", text(article, "title", "No Title")));
        out.push_str(&format!("**Date:** {}\n", text(article, "published_at", "N/A")));
        out.push_str(&format!("**Source:** {}\n\n", text(article, "source", "Unknown")));
        out.push_str(&format!(
            "{}\n\n",
            text(article, "description", "No description available.")
        ));
        out.push_str(&format!("[Read more]({})\n\n---\n\n", text(article, "url", "#")));
    }
    out
}

#[derive(Debug, Deserialize)]
struct SymbolParams {
    symbol: String,
}

fn symbol_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {"type": "string", "description": "Cryptocurrency symbol, e.g. BTC, ETH, SOL"}
        },
        "required": ["symbol"]
    })
}

/// Price, market cap, volume and supply of one coin
pub struct CoinMarketCapInfoTool {
    client: CoinMarketCapClient,
    cache: ResponseCache,
}

impl CoinMarketCapInfoTool {
    pub const NAME: &'static str = "coinmarketcap_info";

    pub fn new(client: CoinMarketCapClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for CoinMarketCapInfoTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = super::parse_params(Self::NAME, params)?;
        let symbol = params.symbol.trim().to_uppercase();
        tracing::info!(symbol = %symbol, "Retrieving cryptocurrency information");

        let response = self
            .cache
            .get_or_fetch(CacheKey::new("coinmarketcap", "quotes", &json!(symbol)), || {
                self.client.quotes_latest(&symbol)
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?;
        Ok(json!(format_info(&symbol, &response)))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get detailed information about a cryptocurrency including price, market cap, \
         volume, circulating supply and rank. Provide the symbol (e.g. BTC, ETH, SOL)."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_list_limit")]
    limit: u32,
    #[serde(default = "default_sort")]
    sort: String,
}

fn default_list_limit() -> u32 {
    25
}

fn default_sort() -> String {
    "market_cap".to_string()
}

/// Top cryptocurrencies by a chosen metric
pub struct CoinMarketCapListTool {
    client: CoinMarketCapClient,
    cache: ResponseCache,
}

impl CoinMarketCapListTool {
    pub const NAME: &'static str = "coinmarketcap_list";

    pub fn new(client: CoinMarketCapClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for CoinMarketCapListTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: ListParams = super::parse_params(Self::NAME, params)?;
        let limit = capped(params.limit, "cryptocurrencies");
        let sort = sort_key(&params.sort);

        let key = CacheKey::new("coinmarketcap", "listings", &json!({ "limit": limit, "sort": sort }));
        let response = self
            .cache
            .get_or_fetch(key, || self.client.listings_latest(limit, sort))
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?;
        Ok(json!(format_listing(limit, &params.sort, &response)))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "List top cryptocurrencies sorted by market cap, 24h volume, price or 24h \
         change, with key metrics for each."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {"type": "integer", "description": "Number of coins (max 100)", "default": 25},
                "sort": {
                    "type": "string",
                    "enum": ["market_cap", "volume_24h", "price", "percent_change_24h"],
                    "default": "market_cap"
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct HistoricalParams {
    symbol: String,
    #[serde(default = "default_time_period")]
    time_period: String,
}

fn default_time_period() -> String {
    "30d".to_string()
}

/// Historical price, volume and market cap of one coin
pub struct CoinMarketCapHistoricalTool {
    client: CoinMarketCapClient,
    cache: ResponseCache,
}

impl CoinMarketCapHistoricalTool {
    pub const NAME: &'static str = "coinmarketcap_historical";

    pub fn new(client: CoinMarketCapClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for CoinMarketCapHistoricalTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: HistoricalParams = super::parse_params(Self::NAME, params)?;
        let symbol = params.symbol.trim().to_uppercase();
        let period = params.time_period;

        let Some(id) = self
            .client
            .resolve_id(&symbol)
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?
        else {
            return Ok(json!(format!("No ID found for cryptocurrency symbol: {symbol}")));
        };

        let key = CacheKey::new("coinmarketcap", "historical", &json!({ "id": id, "period": period }));
        let response = self
            .cache
            .get_or_fetch(key, || {
                self.client.quotes_historical(id, interval_for(&period), &period)
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?;
        Ok(json!(format_history(&symbol, &period, &response)))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get historical price, volume and market cap for a cryptocurrency over \
         24h, 7d, 30d, 3m, 1y or ytd."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {"type": "string", "description": "Cryptocurrency symbol"},
                "time_period": {
                    "type": "string",
                    "enum": ["24h", "7d", "30d", "3m", "1y", "ytd"],
                    "default": "30d"
                }
            },
            "required": ["symbol"]
        })
    }
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default = "default_news_limit")]
    limit: u32,
}

fn default_news_limit() -> u32 {
    10
}

/// Latest crypto news, optionally for one coin
pub struct CoinMarketCapNewsTool {
    client: CoinMarketCapClient,
    cache: ResponseCache,
}

impl CoinMarketCapNewsTool {
    pub const NAME: &'static str = "coinmarketcap_news";

    pub fn new(client: CoinMarketCapClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for CoinMarketCapNewsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: NewsParams = super::parse_params(Self::NAME, params)?;
        let limit = capped(params.limit, "news articles");
        let symbol = params
            .symbol
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty());

        let crypto_id = match symbol.as_deref() {
            Some(symbol) => {
                let id = self
                    .client
                    .resolve_id(symbol)
                    .await
                    .map_err(|e| super::tool_error(Self::NAME, e))?;
                match id {
                    Some(id) => Some(id),
                    None => {
                        return Ok(json!(format!(
                            "No ID found for cryptocurrency symbol: {symbol}"
                        )));
                    }
                }
            }
            None => None,
        };

        let key = CacheKey::new("coinmarketcap", "news", &json!({ "limit": limit, "id": crypto_id }));
        let response = self
            .cache
            .get_or_fetch(key, || self.client.content_latest(limit, crypto_id))
            .await
            .map_err(|e: ResearchError| super::tool_error(Self::NAME, e))?;
        Ok(json!(format_news(symbol.as_deref(), &response)))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get the latest cryptocurrency news from CoinMarketCap, either general or \
         for a specific coin."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {"type": "string", "description": "Optional coin symbol"},
                "limit": {"type": "integer", "description": "Number of articles (max 100)", "default": 10}
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn client(server: &MockServer) -> CoinMarketCapClient {
        CoinMarketCapClient::new(reqwest::Client::new(), server.url("/v1"), Some("k".to_string()))
    }

    fn cache() -> ResponseCache {
        ResponseCache::new(Duration::from_secs(60))
    }

    #[test]
    fn test_interval_and_sort_maps() {
        assert_eq!(interval_for("24h"), "hourly");
        assert_eq!(interval_for("1y"), "weekly");
        assert_eq!(interval_for("3m"), "daily");
        assert_eq!(sort_key("volume_24h"), "volume_24h");
        assert_eq!(sort_key("hype"), "market_cap");
    }

    #[test]
    fn test_format_info() {
        let response = json!({
            "data": {"ETH": {
                "name": "Ethereum",
                "symbol": "ETH",
                "cmc_rank": 2,
                "circulating_supply": 120_000_000.4,
                "max_supply": null,
                "tags": ["pos", "smart-contracts"],
                "quote": {"USD": {
                    "price": 3012.5,
                    "market_cap": 361_500_000_000.0,
                    "volume_24h": 15_000_000_000.0,
                    "percent_change_24h": -1.234,
                    "percent_change_7d": 4.0,
                    "last_updated": "2025-06-01T00:00:00.000Z"
                }}
            }}
        });
        let text = format_info("eth", &response);

        assert!(text.starts_with("## Ethereum (ETH)\n\n"));
        assert!(text.contains("**Current Price:** $3012.5000 USD"));
        assert!(text.contains("**Market Cap:** $361,500,000,000 USD"));
        assert!(text.contains("**24h Change:** -1.23%"));
        assert!(text.contains("**Circulating Supply:** 120,000,000 ETH"));
        assert!(!text.contains("Max Supply"));
        assert!(text.contains("**Market Cap Rank:** #2"));
        assert!(text.contains("**Categories:** pos, smart-contracts"));
        assert_eq!(
            format_info("DOGE", &response),
            "No data found for cryptocurrency symbol: DOGE"
        );
    }

    #[test]
    fn test_format_history_daily_strips_time() {
        let response = json!({"data": {"quotes": [
            {"timestamp": "2025-05-01T00:00:00.000Z", "quote": {"USD": {
                "price": 1.5, "percent_change_24h": 2.0, "volume_24h": 2_000_000.0, "market_cap": 3_000_000_000.0
            }}}
        ]}});
        let text = format_history("ADA", "30d", &response);
        assert!(text.contains("| Date | Price (USD) | 24h Change | Volume | Market Cap |"));
        assert!(text.contains("| 2025-05-01 | $1.5000 | 2.00% | $2.00M | $3.00B |"));

        let hourly = format_history("ADA", "24h", &response);
        assert!(hourly.contains("| 2025-05-01T00:00:00.000Z | $1.5000 | $2.00M | $3.00B |"));
    }

    #[tokio::test]
    async fn test_list_tool_caps_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/cryptocurrency/listings/latest")
                    .query_param("limit", "100")
                    .query_param("sort", "market_cap");
                then.status(200).json_body(json!({"data": [{
                    "cmc_rank": 1, "name": "Bitcoin", "symbol": "BTC",
                    "quote": {"USD": {"price": 65000.0, "percent_change_24h": 1.5,
                                      "market_cap": 1_280_000_000_000.0, "volume_24h": 30_000_000_000.0}}
                }]}));
            })
            .await;

        let tool = CoinMarketCapListTool::new(client(&server), cache());
        let out = tool.execute(json!({"limit": 500})).await.unwrap();

        mock.assert_async().await;
        let text = out.as_str().unwrap();
        assert!(text.starts_with("## Top 100 Cryptocurrencies by Market Cap"));
        assert!(text.contains("| 1 | Bitcoin | BTC | $65000.0000 | 1.50% | $1280.00B | $30000.00M |"));
    }

    #[tokio::test]
    async fn test_historical_tool_resolves_id() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cryptocurrency/map").query_param("symbol", "BTC");
                then.status(200).json_body(json!({"data": [{"id": 1}]}));
            })
            .await;
        let history = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/cryptocurrency/quotes/historical")
                    .query_param("id", "1")
                    .query_param("interval", "weekly")
                    .query_param("time_period", "1y");
                then.status(200).json_body(json!({"data": {"quotes": []}}));
            })
            .await;

        let tool = CoinMarketCapHistoricalTool::new(client(&server), cache());
        let out = tool
            .execute(json!({"symbol": "btc", "time_period": "1y"}))
            .await
            .unwrap();

        history.assert_async().await;
        assert!(out.as_str().unwrap().starts_with("## Historical Data for BTC over 1y"));
    }

    #[tokio::test]
    async fn test_news_tool_unknown_symbol() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cryptocurrency/map");
                then.status(200).json_body(json!({"data": []}));
            })
            .await;

        let tool = CoinMarketCapNewsTool::new(client(&server), cache());
        let out = tool.execute(json!({"symbol": "nope"})).await.unwrap();
        assert_eq!(out, json!("No ID found for cryptocurrency symbol: NOPE"));
    }

    #[tokio::test]
    async fn test_info_tool_http_error_is_tool_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(403).body("forbidden");
            })
            .await;

        let tool = CoinMarketCapInfoTool::new(client(&server), cache());
        let err = tool.execute(json!({"symbol": "BTC"})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tool 'coinmarketcap_info' failed: CoinMarketCap API error: 403 - forbidden"
        );
    }
}
