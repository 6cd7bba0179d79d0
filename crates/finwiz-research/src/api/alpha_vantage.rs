//! Alpha Vantage API client

use crate::config::ALPHA_VANTAGE_KEY_VAR;
use crate::error::{ResearchError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a client allowing `rate_limit` requests per minute
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        rate_limit: u32,
    ) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Company profile and fundamentals, `None` when Alpha Vantage has nothing
    pub async fn company_overview(&self, symbol: &str) -> Result<Option<Value>> {
        self.query("OVERVIEW", symbol).await
    }

    /// ETF holdings and sector weights, `None` when Alpha Vantage has nothing
    pub async fn etf_profile(&self, symbol: &str) -> Result<Option<Value>> {
        self.query("ETF_PROFILE", symbol).await
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Option<Value>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResearchError::MissingApiKey(ALPHA_VANTAGE_KEY_VAR))?;

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("function", function), ("symbol", symbol), ("apikey", api_key)])
            .send()
            .await?;
        let response = super::ensure_success("Alpha Vantage", response).await?;
        let data: Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(ResearchError::api("Alpha Vantage", error.to_string()));
        }

        // Throttled answers carry a "Note" or "Information" message instead of data
        let empty = data.as_object().is_none_or(serde_json::Map::is_empty);
        if empty || data.get("Note").is_some() || data.get("Information").is_some() {
            tracing::warn!(function, symbol, "Alpha Vantage returned no data");
            return Ok(None);
        }

        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer, key: Option<&str>) -> AlphaVantageClient {
        AlphaVantageClient::new(
            reqwest::Client::new(),
            server.url("/query"),
            key.map(str::to_string),
            5,
        )
    }

    #[tokio::test]
    async fn test_company_overview() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "OVERVIEW")
                    .query_param("symbol", "IBM")
                    .query_param("apikey", "demo");
                then.status(200)
                    .json_body(json!({"Symbol": "IBM", "Name": "International Business Machines"}));
            })
            .await;

        let overview = client(&server, Some("demo"))
            .company_overview("IBM")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(overview["Name"], "International Business Machines");
    }

    #[tokio::test]
    async fn test_note_and_empty_mean_no_data() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("symbol", "THROTTLED");
                then.status(200)
                    .json_body(json!({"Note": "Thank you for using Alpha Vantage!"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("symbol", "NOPE");
                then.status(200).json_body(json!({}));
            })
            .await;

        let av = client(&server, Some("demo"));
        assert!(av.company_overview("THROTTLED").await.unwrap().is_none());
        assert!(av.company_overview("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!({}));
            })
            .await;

        let err = client(&server, None).etf_profile("SPY").await.unwrap_err();
        assert!(matches!(err, ResearchError::MissingApiKey(_)));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_error_message_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200)
                    .json_body(json!({"Error Message": "Invalid API call"}));
            })
            .await;

        let err = client(&server, Some("demo"))
            .company_overview("IBM")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid API call"));
    }
}
