//! CoinMarketCap Pro API client

use crate::config::CMC_KEY_VAR;
use crate::error::{ResearchError, Result};
use serde_json::Value;

const PROVIDER: &str = "CoinMarketCap";

/// CoinMarketCap Pro API client
#[derive(Debug, Clone)]
pub struct CoinMarketCapClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinMarketCapClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResearchError::MissingApiKey(CMC_KEY_VAR))?;

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("X-CMC_PRO_API_KEY", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;
        let response = super::ensure_success(PROVIDER, response).await?;
        Ok(response.json().await?)
    }

    /// `/cryptocurrency/quotes/latest` for one symbol, converted to USD
    pub async fn quotes_latest(&self, symbol: &str) -> Result<Value> {
        self.get(
            "/cryptocurrency/quotes/latest",
            &[("symbol", symbol.to_uppercase()), ("convert", "USD".to_string())],
        )
        .await
    }

    /// `/cryptocurrency/listings/latest`
    pub async fn listings_latest(&self, limit: u32, sort: &str) -> Result<Value> {
        self.get(
            "/cryptocurrency/listings/latest",
            &[
                ("limit", limit.to_string()),
                ("sort", sort.to_string()),
                ("convert", "USD".to_string()),
            ],
        )
        .await
    }

    /// Resolve a symbol to its CoinMarketCap id via `/cryptocurrency/map`
    pub async fn resolve_id(&self, symbol: &str) -> Result<Option<u64>> {
        let data = self
            .get("/cryptocurrency/map", &[("symbol", symbol.to_uppercase())])
            .await?;
        Ok(data
            .get("data")
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("id"))
            .and_then(Value::as_u64))
    }

    /// `/cryptocurrency/quotes/historical`
    pub async fn quotes_historical(&self, id: u64, interval: &str, time_period: &str) -> Result<Value> {
        self.get(
            "/cryptocurrency/quotes/historical",
            &[
                ("id", id.to_string()),
                ("convert", "USD".to_string()),
                ("interval", interval.to_string()),
                ("time_period", time_period.to_string()),
            ],
        )
        .await
    }

    /// `/content/latest`, optionally filtered to one coin id
    pub async fn content_latest(&self, limit: u32, crypto_id: Option<u64>) -> Result<Value> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(id) = crypto_id {
            params.push(("cryptocurrencies", id.to_string()));
        }
        self.get("/content/latest", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sends_key_header() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/cryptocurrency/quotes/latest")
                    .header("X-CMC_PRO_API_KEY", "secret")
                    .query_param("symbol", "BTC")
                    .query_param("convert", "USD");
                then.status(200).json_body(json!({"data": {}}));
            })
            .await;

        let client = CoinMarketCapClient::new(
            reqwest::Client::new(),
            server.url("/v1"),
            Some("secret".to_string()),
        );
        client.quotes_latest("btc").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_id() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cryptocurrency/map").query_param("symbol", "SOL");
                then.status(200)
                    .json_body(json!({"data": [{"id": 5426, "symbol": "SOL"}]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cryptocurrency/map").query_param("symbol", "NONE");
                then.status(200).json_body(json!({"data": []}));
            })
            .await;

        let client = CoinMarketCapClient::new(
            reqwest::Client::new(),
            server.url("/v1"),
            Some("k".to_string()),
        );
        assert_eq!(client.resolve_id("sol").await.unwrap(), Some(5426));
        assert_eq!(client.resolve_id("none").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(401).body("{\"status\":{\"error_message\":\"API key missing.\"}}");
            })
            .await;

        let client = CoinMarketCapClient::new(
            reqwest::Client::new(),
            server.url("/v1"),
            Some("bad".to_string()),
        );
        let err = client.listings_latest(10, "market_cap").await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("CoinMarketCap API error: 401"));
        assert!(message.contains("API key missing."));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = CoinMarketCapClient::new(reqwest::Client::new(), "http://127.0.0.1:1", None);
        let err = client.content_latest(5, None).await.unwrap_err();
        assert!(matches!(err, ResearchError::MissingApiKey(CMC_KEY_VAR)));
    }
}
