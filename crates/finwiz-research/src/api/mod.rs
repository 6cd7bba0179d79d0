//! API clients for market data and web research providers

pub mod alpha_vantage;
pub mod coinmarketcap;
pub mod firecrawl;
pub mod kraken;
pub mod serper;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use coinmarketcap::CoinMarketCapClient;
pub use firecrawl::FirecrawlClient;
pub use kraken::KrakenClient;
pub use serper::{SerperClient, SearchKind};
pub use yahoo::YahooFinanceClient;

use crate::error::{ResearchError, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("finwiz/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the JSON APIs
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ResearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Turn a non-2xx response into `{provider} API error: {status} - {body}`
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(provider, status = status.as_u16(), "Upstream request failed");
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ResearchError::RateLimitExceeded {
            provider: provider.to_string(),
        });
    }
    Err(ResearchError::api(
        provider,
        format!("{} - {}", status.as_u16(), body.trim()),
    ))
}
