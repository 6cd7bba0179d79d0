//! Serper (Google search) API client

use crate::config::SERPER_KEY_VAR;
use crate::error::{ResearchError, Result};
use serde_json::{Value, json};

/// Which Serper index to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Search,
    News,
}

impl SearchKind {
    fn path(self) -> &'static str {
        match self {
            SearchKind::Search => "/search",
            SearchKind::News => "/news",
        }
    }

    /// Key of the result list in the response
    pub fn results_key(self) -> &'static str {
        match self {
            SearchKind::Search => "organic",
            SearchKind::News => "news",
        }
    }
}

/// Serper API client
#[derive(Debug, Clone)]
pub struct SerperClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SerperClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Run a query and return the result entries
    pub async fn query(&self, kind: SearchKind, query: &str, num: usize) -> Result<Vec<Value>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResearchError::MissingApiKey(SERPER_KEY_VAR))?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, kind.path()))
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query, "num": num }))
            .send()
            .await?;
        let response = super::ensure_success("Serper", response).await?;
        let mut body: Value = response.json().await?;

        let results = match body.get_mut(kind.results_key()).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Ok(results.into_iter().take(num).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_news_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/news")
                    .header("X-API-KEY", "key")
                    .json_body(json!({"q": "swiss franc", "num": 2}));
                then.status(200).json_body(json!({
                    "news": [
                        {"title": "A", "link": "https://a"},
                        {"title": "B", "link": "https://b"},
                        {"title": "C", "link": "https://c"}
                    ]
                }));
            })
            .await;

        let client = SerperClient::new(reqwest::Client::new(), server.base_url(), Some("key".to_string()));
        let results = client.query(SearchKind::News, "swiss franc", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["title"], "B");
    }

    #[tokio::test]
    async fn test_missing_results_key_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/search");
                then.status(200).json_body(json!({"searchParameters": {}}));
            })
            .await;

        let client = SerperClient::new(reqwest::Client::new(), server.base_url(), Some("key".to_string()));
        let results = client.query(SearchKind::Search, "nothing", 25).await.unwrap();
        assert!(results.is_empty());
    }
}
