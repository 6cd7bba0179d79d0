//! Kraken ticker tool

use crate::api::KrakenClient;
use crate::api::kraken::Ticker;
use crate::cache::{CacheKey, ResponseCache};
use crate::error::ResearchError;
use crate::format::number;
use async_trait::async_trait;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};

fn field(data: &Value, key: &str, index: usize) -> Value {
    data.get(key)
        .and_then(|v| v.get(index))
        .and_then(number)
        .map_or(Value::Null, |n| json!(n))
}

/// Flatten Kraken's array-encoded ticker into named fields
pub fn summarize_ticker(ticker: &Ticker) -> Value {
    let data = &ticker.data;
    json!({
        "pair": ticker.pair,
        "ask": field(data, "a", 0),
        "bid": field(data, "b", 0),
        "last": field(data, "c", 0),
        "volume_today": field(data, "v", 0),
        "volume_24h": field(data, "v", 1),
        "vwap_24h": field(data, "p", 1),
        "trades_24h": field(data, "t", 1),
        "low_24h": field(data, "l", 1),
        "high_24h": field(data, "h", 1),
        "open": data.get("o").and_then(number).map_or(Value::Null, |n| json!(n)),
    })
}

#[derive(Debug, Deserialize)]
struct TickerParams {
    pair: String,
}

/// Real-time price and volume from Kraken's public API
pub struct KrakenTickerTool {
    client: KrakenClient,
    cache: ResponseCache,
}

impl KrakenTickerTool {
    pub const NAME: &'static str = "kraken_ticker";

    pub fn new(client: KrakenClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for KrakenTickerTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: TickerParams = super::parse_params(Self::NAME, params)?;
        let pair = params.pair.trim().to_uppercase();

        self.cache
            .get_or_fetch(CacheKey::new("kraken", "ticker", &json!(pair)), || async {
                let summary = match self.client.ticker(&pair).await? {
                    Some(ticker) => summarize_ticker(&ticker),
                    None => json!(format!(
                        "No data found for pair {pair}. It may be an invalid pair."
                    )),
                };
                Ok::<_, ResearchError>(summary)
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get real-time ticker data (ask, bid, last trade, 24h volume, VWAP, high, low) \
         for a Kraken trading pair such as 'XBTUSD' or 'ETHUSD'."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pair": {"type": "string", "description": "Kraken pair, e.g. XBTUSD"}
            },
            "required": ["pair"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    #[test]
    fn test_summarize_ticker() {
        let ticker = Ticker {
            pair: "XETHZUSD".to_string(),
            data: json!({
                "a": ["3001.10", "1", "1.000"],
                "b": ["3000.90", "2", "2.000"],
                "c": ["3001.00", "0.5"],
                "v": ["1200.5", "4800.25"],
                "p": ["2990.0", "2985.5"],
                "t": [1500, 6200],
                "l": ["2950.0", "2900.0"],
                "h": ["3050.0", "3100.0"],
                "o": "2970.00"
            }),
        };
        let summary = summarize_ticker(&ticker);

        assert_eq!(summary["pair"], "XETHZUSD");
        assert_eq!(summary["ask"], json!(3001.1));
        assert_eq!(summary["volume_24h"], json!(4800.25));
        assert_eq!(summary["trades_24h"], json!(6200.0));
        assert_eq!(summary["low_24h"], json!(2900.0));
        assert_eq!(summary["open"], json!(2970.0));
    }

    #[tokio::test]
    async fn test_unknown_pair_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/0/public/Ticker");
                then.status(200).json_body(json!({"error": [], "result": {}}));
            })
            .await;

        let tool = KrakenTickerTool::new(
            KrakenClient::new(reqwest::Client::new(), server.base_url()),
            ResponseCache::new(Duration::from_secs(60)),
        );
        let out = tool.execute(json!({"pair": "foousd"})).await.unwrap();
        assert_eq!(
            out,
            json!("No data found for pair FOOUSD. It may be an invalid pair.")
        );
    }

    #[tokio::test]
    async fn test_kraken_error_is_tool_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/0/public/Ticker");
                then.status(200)
                    .json_body(json!({"error": ["EQuery:Unknown asset pair"], "result": {}}));
            })
            .await;

        let tool = KrakenTickerTool::new(
            KrakenClient::new(reqwest::Client::new(), server.base_url()),
            ResponseCache::new(Duration::from_secs(60)),
        );
        let err = tool.execute(json!({"pair": "XYZ"})).await.unwrap_err();
        assert!(err.to_string().contains("EQuery:Unknown asset pair"));
    }
}
