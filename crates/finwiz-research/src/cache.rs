//! Caching layer for market data responses

use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for upstream requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Upstream provider, e.g. `coinmarketcap`
    pub source: String,
    /// Endpoint or operation type
    pub endpoint: String,
    /// Request parameters as a JSON string
    pub params: String,
}

impl CacheKey {
    pub fn new(
        source: impl Into<String>,
        endpoint: impl Into<String>,
        params: &serde_json::Value,
    ) -> Self {
        Self {
            source: source.into(),
            endpoint: endpoint.into(),
            params: params.to_string(),
        }
    }
}

/// Thread-safe TTL cache of JSON responses
#[derive(Clone)]
pub struct ResponseCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl ResponseCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(source = %key.source, endpoint = %key.endpoint, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(source = %key.source, endpoint = %key.endpoint, "Cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Caches grouped by how quickly their data goes stale
#[derive(Clone)]
pub struct CacheManager {
    /// Quotes and prices
    pub realtime: ResponseCache,
    /// Company and fund profiles
    pub fundamental: ResponseCache,
    /// Headlines and search results
    pub news: ResponseCache,
}

impl CacheManager {
    pub fn new(realtime_ttl: Duration, fundamental_ttl: Duration, news_ttl: Duration) -> Self {
        Self {
            realtime: ResponseCache::new(realtime_ttl),
            fundamental: ResponseCache::new(fundamental_ttl),
            news: ResponseCache::new(news_ttl),
        }
    }

    pub fn from_config(config: &crate::ResearchConfig) -> Self {
        Self::new(
            config.cache_ttl_realtime,
            config.cache_ttl_fundamental,
            config.cache_ttl_news,
        )
    }

    pub async fn clear_all(&self) {
        self.realtime.clear().await;
        self.fundamental.clear().await;
        self.news.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let key = CacheKey::new("kraken", "ticker", &json!({"pair": "XBTUSD"}));
        let value = json!({"last": 64000.0});

        cache.insert(key.clone(), value.clone()).await;
        assert_eq!(cache.get(&key).await, Some(value));
    }

    #[tokio::test]
    async fn test_cache_get_or_fetch() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let key = CacheKey::new("coinmarketcap", "quotes", &json!({"symbol": "ETH"}));
        let value = json!({"price": 3100.0});

        let mut call_count = 0;
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);

        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(json!(null)) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(call_count, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_not_cached() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let key = CacheKey::new("serper", "search", &json!({"q": "etf"}));

        let result = cache
            .get_or_fetch(key.clone(), || async { Err::<serde_json::Value, _>("down") })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_manager_clear_all() {
        let manager = CacheManager::new(
            Duration::from_secs(60),
            Duration::from_secs(3600),
            Duration::from_secs(300),
        );
        let key = CacheKey::new("yahoo", "quote", &json!({}));

        manager.realtime.insert(key.clone(), json!(1)).await;
        manager.news.insert(key, json!(2)).await;
        assert_eq!(manager.realtime.len().await, 1);

        manager.clear_all().await;
        assert!(manager.realtime.is_empty().await);
        assert!(manager.news.is_empty().await);
    }
}
