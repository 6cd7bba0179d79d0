//! Configuration for market data clients and research tools

use crate::error::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
pub const CMC_KEY_VAR: &str = "CMC_PRO_API_KEY";
/// Header-style name some `.env` files use for the CoinMarketCap key
pub const CMC_KEY_FALLBACK_VAR: &str = "X-CMC_PRO_API_KEY";
pub const SERPER_KEY_VAR: &str = "SERPER_API_KEY";
pub const FIRECRAWL_KEY_VAR: &str = "FIRECRAWL_API_KEY";

/// Upstream base URLs, overridable for tests and proxies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub alpha_vantage: String,
    pub coinmarketcap: String,
    pub kraken: String,
    pub serper: String,
    pub firecrawl: String,
    pub yahoo_search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            alpha_vantage: "https://www.alphavantage.co/query".to_string(),
            coinmarketcap: "https://pro-api.coinmarketcap.com/v1".to_string(),
            kraken: "https://api.kraken.com".to_string(),
            serper: "https://google.serper.dev".to_string(),
            firecrawl: "https://api.firecrawl.dev/v1".to_string(),
            yahoo_search: "https://query1.finance.yahoo.com/v1/finance/search".to_string(),
        }
    }
}

/// Configuration for research operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    pub alpha_vantage_api_key: Option<String>,
    pub cmc_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub firecrawl_api_key: Option<String>,

    pub endpoints: Endpoints,

    /// Timeout for every HTTP request except Kraken's
    pub request_timeout: Duration,
    pub kraken_timeout: Duration,

    /// Cache TTL for real-time data (quotes, prices)
    pub cache_ttl_realtime: Duration,
    /// Cache TTL for fundamental data
    pub cache_ttl_fundamental: Duration,
    /// Cache TTL for news data
    pub cache_ttl_news: Duration,

    /// Alpha Vantage requests per minute (free tier is 5)
    pub alpha_vantage_rate_limit: u32,

    /// Number of results asked from web search
    pub search_results: usize,

    /// Root holding per-crew output directories
    pub output_root: PathBuf,
    /// Directory holding knowledge collections
    pub knowledge_dir: PathBuf,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            cmc_api_key: None,
            serper_api_key: None,
            firecrawl_api_key: None,
            endpoints: Endpoints::default(),
            request_timeout: Duration::from_secs(30),
            kraken_timeout: Duration::from_secs(10),
            cache_ttl_realtime: Duration::from_secs(60),
            cache_ttl_fundamental: Duration::from_secs(3600),
            cache_ttl_news: Duration::from_secs(300),
            alpha_vantage_rate_limit: 5,
            search_results: 25,
            output_root: PathBuf::from("output"),
            knowledge_dir: PathBuf::from("knowledge"),
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Defaults with API keys read from the environment
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env_api_keys().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_rate_limit == 0 {
            return Err(ResearchError::Config(
                "alpha_vantage_rate_limit must be greater than 0".to_string(),
            ));
        }
        if self.search_results == 0 {
            return Err(ResearchError::Config(
                "search_results must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() || self.kraken_timeout.is_zero() {
            return Err(ResearchError::Config(
                "request timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for ResearchConfig
#[derive(Debug, Default)]
pub struct ResearchConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    cmc_api_key: Option<String>,
    serper_api_key: Option<String>,
    firecrawl_api_key: Option<String>,
    endpoints: Option<Endpoints>,
    request_timeout: Option<Duration>,
    kraken_timeout: Option<Duration>,
    cache_ttl_realtime: Option<Duration>,
    cache_ttl_fundamental: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    alpha_vantage_rate_limit: Option<u32>,
    search_results: Option<usize>,
    output_root: Option<PathBuf>,
    knowledge_dir: Option<PathBuf>,
}

impl ResearchConfigBuilder {
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    pub fn cmc_api_key(mut self, key: impl Into<String>) -> Self {
        self.cmc_api_key = Some(key.into());
        self
    }

    pub fn serper_api_key(mut self, key: impl Into<String>) -> Self {
        self.serper_api_key = Some(key.into());
        self
    }

    pub fn firecrawl_api_key(mut self, key: impl Into<String>) -> Self {
        self.firecrawl_api_key = Some(key.into());
        self
    }

    /// Point every upstream at different base URLs
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn kraken_timeout(mut self, duration: Duration) -> Self {
        self.kraken_timeout = Some(duration);
        self
    }

    pub fn cache_ttl_realtime(mut self, duration: Duration) -> Self {
        self.cache_ttl_realtime = Some(duration);
        self
    }

    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    pub fn cache_ttl_news(mut self, duration: Duration) -> Self {
        self.cache_ttl_news = Some(duration);
        self
    }

    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    pub fn search_results(mut self, count: usize) -> Self {
        self.search_results = Some(count);
        self
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = Some(path.into());
        self
    }

    pub fn knowledge_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.knowledge_dir = Some(path.into());
        self
    }

    /// Fill unset API keys from the environment.
    ///
    /// The CoinMarketCap key is read from `CMC_PRO_API_KEY`, then from
    /// `X-CMC_PRO_API_KEY`.
    pub fn with_env_api_keys(mut self) -> Self {
        if self.alpha_vantage_api_key.is_none() {
            self.alpha_vantage_api_key = env_key(ALPHA_VANTAGE_KEY_VAR);
        }
        if self.cmc_api_key.is_none() {
            self.cmc_api_key = env_key(CMC_KEY_VAR).or_else(|| env_key(CMC_KEY_FALLBACK_VAR));
        }
        if self.serper_api_key.is_none() {
            self.serper_api_key = env_key(SERPER_KEY_VAR);
        }
        if self.firecrawl_api_key.is_none() {
            self.firecrawl_api_key = env_key(FIRECRAWL_KEY_VAR);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResearchConfig> {
        let defaults = ResearchConfig::default();

        let config = ResearchConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            cmc_api_key: self.cmc_api_key,
            serper_api_key: self.serper_api_key,
            firecrawl_api_key: self.firecrawl_api_key,
            endpoints: self.endpoints.unwrap_or(defaults.endpoints),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            kraken_timeout: self.kraken_timeout.unwrap_or(defaults.kraken_timeout),
            cache_ttl_realtime: self.cache_ttl_realtime.unwrap_or(defaults.cache_ttl_realtime),
            cache_ttl_fundamental: self
                .cache_ttl_fundamental
                .unwrap_or(defaults.cache_ttl_fundamental),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(defaults.cache_ttl_news),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            search_results: self.search_results.unwrap_or(defaults.search_results),
            output_root: self.output_root.unwrap_or(defaults.output_root),
            knowledge_dir: self.knowledge_dir.unwrap_or(defaults.knowledge_dir),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResearchConfig::default();
        assert_eq!(config.kraken_timeout, Duration::from_secs(10));
        assert_eq!(config.search_results, 25);
        assert_eq!(
            config.endpoints.coinmarketcap,
            "https://pro-api.coinmarketcap.com/v1"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ResearchConfig::builder()
            .cmc_api_key("cmc")
            .search_results(10)
            .output_root("/tmp/finwiz")
            .build()
            .unwrap();

        assert_eq!(config.cmc_api_key.as_deref(), Some("cmc"));
        assert_eq!(config.search_results, 10);
        assert_eq!(config.output_root, PathBuf::from("/tmp/finwiz"));
        assert_eq!(config.cache_ttl_news, Duration::from_secs(300));
    }

    #[test]
    fn test_validation_rejects_zero_rate_limit() {
        let result = ResearchConfig::builder().alpha_vantage_rate_limit(0).build();
        assert!(matches!(result, Err(ResearchError::Config(_))));
    }

    #[test]
    fn test_explicit_key_wins_over_env() {
        let config = ResearchConfig::builder()
            .serper_api_key("explicit")
            .with_env_api_keys()
            .build()
            .unwrap();
        assert_eq!(config.serper_api_key.as_deref(), Some("explicit"));
    }
}
