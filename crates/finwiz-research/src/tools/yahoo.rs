//! Yahoo Finance quote, history and news tools

use crate::api::YahooFinanceClient;
use crate::api::yahoo::{NewsItem, Quote};
use crate::cache::{CacheKey, ResponseCache};
use crate::error::ResearchError;
use async_trait::async_trait;
use chrono::DateTime;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};

fn quote_json(q: &Quote) -> Value {
    json!({
        "timestamp": q.timestamp.to_rfc3339(),
        "open": q.open,
        "high": q.high,
        "low": q.low,
        "close": q.close,
        "volume": q.volume,
        "adjusted_close": q.adjclose,
    })
}

#[derive(Debug, Deserialize)]
struct TickerParams {
    ticker: String,
}

/// Latest quote for a ticker
pub struct YahooTickerInfoTool {
    client: YahooFinanceClient,
    cache: ResponseCache,
}

impl YahooTickerInfoTool {
    pub const NAME: &'static str = "yahoo_finance_ticker_info";

    pub fn new(client: YahooFinanceClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for YahooTickerInfoTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: TickerParams = super::parse_params(Self::NAME, params)?;
        let symbol = params.ticker.trim().to_uppercase();

        self.cache
            .get_or_fetch(CacheKey::new("yahoo", "quote", &json!(symbol)), || async {
                let quote = self.client.get_quote(&symbol).await?;
                let mut value = quote_json(&quote);
                value["symbol"] = json!(symbol);
                Ok::<_, ResearchError>(value)
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get the latest quote (open, high, low, close, volume) for a stock, ETF or \
         crypto ticker from Yahoo Finance, e.g. 'AAPL', 'VWRL.SW', 'BTC-USD'."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {"type": "string", "description": "Ticker symbol"}
            },
            "required": ["ticker"]
        })
    }
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    ticker: String,
    #[serde(default = "default_period")]
    period: String,
}

fn default_period() -> String {
    "1mo".to_string()
}

/// Summary statistics plus the bars of a history window
pub fn summarize_history(symbol: &str, period: &str, quotes: &[Quote]) -> Value {
    let (Some(first), Some(last)) = (quotes.first(), quotes.last()) else {
        return json!({
            "symbol": symbol,
            "period": period,
            "data_points": 0,
        });
    };

    let high = quotes.iter().map(|q| q.high).fold(f64::MIN, f64::max);
    let low = quotes.iter().map(|q| q.low).fold(f64::MAX, f64::min);
    let change_percent = if first.close == 0.0 {
        0.0
    } else {
        (last.close - first.close) / first.close * 100.0
    };

    json!({
        "symbol": symbol,
        "period": period,
        "data_points": quotes.len(),
        "first_close": first.close,
        "last_close": last.close,
        "change_percent": (change_percent * 100.0).round() / 100.0,
        "period_high": high,
        "period_low": low,
        "history": quotes.iter().map(quote_json).collect::<Vec<_>>(),
    })
}

/// OHLCV history over a named period
pub struct YahooHistoryTool {
    client: YahooFinanceClient,
    cache: ResponseCache,
}

impl YahooHistoryTool {
    pub const NAME: &'static str = "yahoo_finance_history";

    pub fn new(client: YahooFinanceClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for YahooHistoryTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: HistoryParams = super::parse_params(Self::NAME, params)?;
        let symbol = params.ticker.trim().to_uppercase();
        let period = params.period;

        let key = CacheKey::new("yahoo", "history", &json!({ "symbol": symbol, "period": period }));
        self.cache
            .get_or_fetch(key, || async {
                let quotes = self.client.get_historical_range(&symbol, &period).await?;
                Ok::<_, ResearchError>(summarize_history(&symbol, &period, &quotes))
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get historical daily prices for a ticker from Yahoo Finance with the \
         period change, high and low."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {"type": "string", "description": "Ticker symbol"},
                "period": {
                    "type": "string",
                    "enum": ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"],
                    "default": "1mo"
                }
            },
            "required": ["ticker"]
        })
    }
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    ticker: String,
    #[serde(default = "default_news_limit")]
    limit: usize,
}

fn default_news_limit() -> usize {
    5
}

/// Render headlines as a numbered list
pub fn format_news(ticker: &str, news: &[NewsItem]) -> String {
    if news.is_empty() {
        return format!("No recent news found for {ticker}.");
    }

    let mut out = format!("Recent news for {ticker}:\n\n");
    for (i, item) in news.iter().enumerate() {
        let published = item
            .provider_publish_time
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map_or_else(
                || "Unknown date".to_string(),
                |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
            );
        out.push_str(&format!(
            "{}. {}\n   Publisher: {} | Date: {}\n   Link: {}\n\n",
            i + 1,
            item.title.as_deref().unwrap_or("No title"),
            item.publisher.as_deref().unwrap_or("Unknown publisher"),
            published,
            item.link.as_deref().unwrap_or("#"),
        ));
    }
    out
}

/// Recent headlines for a ticker
pub struct YahooNewsTool {
    client: YahooFinanceClient,
    cache: ResponseCache,
}

impl YahooNewsTool {
    pub const NAME: &'static str = "yahoo_finance_news";

    pub fn new(client: YahooFinanceClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for YahooNewsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: NewsParams = super::parse_params(Self::NAME, params)?;
        let ticker = params.ticker.trim().to_uppercase();
        let limit = params.limit.max(1);

        let key = CacheKey::new("yahoo", "news", &json!({ "ticker": ticker, "limit": limit }));
        self.cache
            .get_or_fetch(key, || async {
                let news = self.client.get_news(&ticker, limit).await?;
                Ok::<_, ResearchError>(json!(format_news(&ticker, &news)))
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get recent news headlines for a stock, ETF or crypto ticker from Yahoo \
         Finance, with publishers and links."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {"type": "string", "description": "Ticker symbol"},
                "limit": {"type": "integer", "description": "Maximum headlines", "default": 5}
            },
            "required": ["ticker"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;
    use std::time::Duration;

    fn bar(day: u32, close: f64, high: f64, low: f64) -> Quote {
        Quote {
            symbol: "NESN.SW".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 5, day, 0, 0, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
            adjclose: close,
        }
    }

    #[test]
    fn test_summarize_history() {
        let quotes = vec![bar(1, 100.0, 101.0, 98.0), bar(2, 110.0, 112.5, 105.0)];
        let summary = summarize_history("NESN.SW", "5d", &quotes);

        assert_eq!(summary["data_points"], 2);
        assert_eq!(summary["change_percent"], 10.0);
        assert_eq!(summary["period_high"], 112.5);
        assert_eq!(summary["period_low"], 98.0);
        assert_eq!(summary["history"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_summarize_empty_history() {
        let summary = summarize_history("X", "1mo", &[]);
        assert_eq!(summary["data_points"], 0);
        assert!(summary.get("history").is_none());
    }

    #[test]
    fn test_format_news() {
        let news = vec![NewsItem {
            title: Some("Chipmaker beats estimates".to_string()),
            publisher: Some("Reuters".to_string()),
            link: Some("https://example.com/1".to_string()),
            provider_publish_time: Some(1_735_689_600),
        }];
        let text = format_news("NVDA", &news);

        assert!(text.starts_with("Recent news for NVDA:\n\n"));
        assert!(text.contains("1. Chipmaker beats estimates"));
        assert!(text.contains("Publisher: Reuters | Date: 2025-01-01 00:00"));
        assert_eq!(format_news("NVDA", &[]), "No recent news found for NVDA.");
    }

    #[tokio::test]
    async fn test_news_tool_end_to_end() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search").query_param("q", "MSFT");
                then.status(200).json_body(json!({"news": [{"title": "Cloud growth"}]}));
            })
            .await;

        let client = YahooFinanceClient::new(reqwest::Client::new(), server.url("/search"));
        let tool = YahooNewsTool::new(client, ResponseCache::new(Duration::from_secs(60)));
        let out = tool.execute(json!({"ticker": "msft"})).await.unwrap();

        let text = out.as_str().unwrap();
        assert!(text.contains("Recent news for MSFT:"));
        assert!(text.contains("1. Cloud growth"));
    }

    #[tokio::test]
    async fn test_missing_ticker_is_tool_error() {
        let client = YahooFinanceClient::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let tool = YahooTickerInfoTool::new(client, ResponseCache::new(Duration::from_secs(60)));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(err.to_string().starts_with("Tool 'yahoo_finance_ticker_info' failed"));
    }
}
