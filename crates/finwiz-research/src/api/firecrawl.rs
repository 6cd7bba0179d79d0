//! Firecrawl search and scrape API client

use crate::config::FIRECRAWL_KEY_VAR;
use crate::error::{ResearchError, Result};
use serde::Deserialize;
use serde_json::{Value, json};

/// Firecrawl API client
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// A scraped page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    pub title: Option<String>,
    pub markdown: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
}

impl FirecrawlClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, path: &str, body: Value) -> Result<T> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResearchError::MissingApiKey(FIRECRAWL_KEY_VAR))?;

        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let response = super::ensure_success("Firecrawl", response).await?;
        let envelope: Envelope<T> = response.json().await?;

        if !envelope.success {
            let message = envelope.error.unwrap_or_else(|| "request unsuccessful".to_string());
            return Err(ResearchError::api("Firecrawl", message));
        }
        envelope
            .data
            .ok_or_else(|| ResearchError::api("Firecrawl", "response has no data"))
    }

    /// Web search returning `{url, title, description}` entries
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Value>> {
        self.post("/search", json!({ "query": query, "limit": limit }))
            .await
    }

    /// Scrape one page as markdown
    pub async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        let data: ScrapeData = self
            .post("/scrape", json!({ "url": url, "formats": ["markdown"] }))
            .await?;

        let title = data
            .metadata
            .as_ref()
            .and_then(|m| m.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(ScrapedPage {
            title,
            markdown: data.markdown.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_scrape() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/scrape")
                    .header("Authorization", "Bearer fc-key");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": {"markdown": "# Fund facts", "metadata": {"title": "VWRL"}}
                }));
            })
            .await;

        let client = FirecrawlClient::new(
            reqwest::Client::new(),
            server.url("/v1"),
            Some("fc-key".to_string()),
        );
        let page = client.scrape("https://example.com/vwrl").await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.title.as_deref(), Some("VWRL"));
        assert_eq!(page.markdown, "# Fund facts");
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/search");
                then.status(200)
                    .json_body(json!({"success": false, "error": "Insufficient credits"}));
            })
            .await;

        let client = FirecrawlClient::new(
            reqwest::Client::new(),
            server.url("/v1"),
            Some("fc-key".to_string()),
        );
        let err = client.search("etf", 5).await.unwrap_err();
        assert_eq!(err.to_string(), "Firecrawl API error: Insufficient credits");
    }
}
