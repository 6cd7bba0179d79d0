//! Yahoo Finance API client

use crate::error::{ResearchError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
///
/// Quotes and history go through `yahoo_finance_api`; headlines come from
/// the public search endpoint, whose URL is configurable.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    http: reqwest::Client,
    search_url: String,
}

/// One OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// A headline from the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub provider_publish_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

impl YahooFinanceClient {
    pub fn new(http: reqwest::Client, search_url: impl Into<String>) -> Self {
        Self {
            http,
            search_url: search_url.into(),
        }
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| ResearchError::YahooFinance(e.to_string()))
    }

    /// Get the latest quote for a symbol
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| ResearchError::YahooFinance(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| ResearchError::YahooFinance(e.to_string()))?;

        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            adjclose: quote.adjclose,
        })
    }

    /// Get historical quotes between two instants
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let provider = Self::connector()?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| ResearchError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| ResearchError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| ResearchError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| ResearchError::YahooFinance(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| Quote {
                symbol: symbol.to_string(),
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adjclose: q.adjclose,
            })
            .collect())
    }

    /// Get historical quotes for a named period such as `1mo` or `ytd`
    pub async fn get_historical_range(&self, symbol: &str, period: &str) -> Result<Vec<Quote>> {
        let end = Utc::now();
        let start = period_start(period, end)?;
        self.get_historical_quotes(symbol, start, end).await
    }

    /// Recent headlines mentioning `symbol`
    pub async fn get_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let count = limit.to_string();
        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("q", symbol),
                ("quotesCount", "0"),
                ("newsCount", count.as_str()),
            ])
            .send()
            .await?;
        let response = super::ensure_success("Yahoo Finance", response).await?;

        let body: SearchResponse = response.json().await?;
        Ok(body.news.into_iter().take(limit).collect())
    }
}

/// Start of a named history period ending at `end`
pub fn period_start(period: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let days = match period {
        "1d" => 1,
        "5d" => 5,
        "1mo" => 30,
        "3mo" => 90,
        "6mo" => 180,
        "1y" => 365,
        "2y" => 730,
        "5y" => 1825,
        "10y" => 3650,
        "max" => 36500,
        "ytd" => {
            return chrono::NaiveDate::from_ymd_opt(end.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
                .ok_or_else(|| ResearchError::InvalidInput("invalid year start".to_string()));
        }
        _ => return Err(ResearchError::InvalidInput(format!("Invalid period: {period}"))),
    };
    Ok(end - chrono::Duration::days(days))
}
