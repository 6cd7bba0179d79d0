//! Kraken public REST API client

use crate::error::{ResearchError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Kraken public market data client
#[derive(Debug, Clone)]
pub struct KrakenClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Map<String, Value>,
}

/// Ticker of a single pair as Kraken names it
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    /// Pair key from the response, e.g. `XXBTZUSD`
    pub pair: String,
    pub data: Value,
}

impl KrakenClient {
    /// `client` should carry Kraken's own timeout
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ticker information of the first pair Kraken returns for `pair`.
    ///
    /// `Ok(None)` when Kraken answers with an empty result.
    pub async fn ticker(&self, pair: &str) -> Result<Option<Ticker>> {
        let response = self
            .client
            .get(format!("{}/0/public/Ticker", self.base_url))
            .query(&[("pair", pair)])
            .send()
            .await?;
        let response = super::ensure_success("Kraken", response).await?;
        let envelope: Envelope = response.json().await?;

        if !envelope.error.is_empty() {
            return Err(ResearchError::api("Kraken", envelope.error.join(", ")));
        }

        Ok(envelope
            .result
            .into_iter()
            .next()
            .map(|(pair, data)| Ticker { pair, data }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_ticker_first_pair() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/0/public/Ticker").query_param("pair", "XBTUSD");
                then.status(200).json_body(json!({
                    "error": [],
                    "result": {"XXBTZUSD": {"c": ["64000.1", "0.01"]}}
                }));
            })
            .await;

        let client = KrakenClient::new(reqwest::Client::new(), server.base_url());
        let ticker = client.ticker("XBTUSD").await.unwrap().unwrap();
        assert_eq!(ticker.pair, "XXBTZUSD");
        assert_eq!(ticker.data["c"][0], "64000.1");
    }

    #[tokio::test]
    async fn test_error_array_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/0/public/Ticker");
                then.status(200)
                    .json_body(json!({"error": ["EQuery:Unknown asset pair"]}));
            })
            .await;

        let client = KrakenClient::new(reqwest::Client::new(), server.base_url());
        let err = client.ticker("NOPE").await.unwrap_err();
        assert_eq!(err.to_string(), "Kraken API error: EQuery:Unknown asset pair");
    }

    #[tokio::test]
    async fn test_empty_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/0/public/Ticker");
                then.status(200).json_body(json!({"error": [], "result": {}}));
            })
            .await;

        let client = KrakenClient::new(reqwest::Client::new(), server.base_url());
        assert!(client.ticker("XBTUSD").await.unwrap().is_none());
    }
}
