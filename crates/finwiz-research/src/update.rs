//! Periodic refresh of the knowledge collections with market snapshots

use crate::api::{CoinMarketCapClient, KrakenClient, YahooFinanceClient};
use crate::error::{ResearchError, Result};
use crate::format::{grouped, number};
use crate::knowledge::KnowledgeStore;
use async_trait::async_trait;
use chrono::Local;
use finwiz_core::Domain;

/// Tickers refreshed for a domain when none are given
pub fn default_tickers(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Stock => &["AAPL", "MSFT", "GOOGL", "AMZN", "META"],
        Domain::Etf => &["SPY", "QQQ", "VTI", "ARKK", "XLF"],
        Domain::Crypto => &["BTC", "ETH", "SOL", "ADA", "DOT"],
        Domain::Report => &[],
    }
}

/// Point-in-time market data for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    /// Ordered label/value pairs rendered after the price
    pub details: Vec<(String, String)>,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            price: None,
            details: Vec::new(),
        }
    }

    fn detail(mut self, label: &str, value: impl Into<String>) -> Self {
        self.details.push((label.to_string(), value.into()));
        self
    }

    /// Knowledge entry text for this snapshot
    pub fn entry_text(&self, date: &str) -> String {
        let title = match &self.name {
            Some(name) => format!("{name} ({})", self.symbol),
            None => self.symbol.clone(),
        };
        let price = self
            .price
            .map_or_else(|| "Unknown".to_string(), |p| format!("{p:.2}"));

        let mut text = format!("Market Data Update for {title} - {date}\nCurrent Price: {price}\n");
        for (label, value) in &self.details {
            text.push_str(&format!("{label}: {value}\n"));
        }
        text.push_str(
            "\nThis data was collected automatically during the periodic knowledge base update.",
        );
        text
    }
}

/// Where snapshots come from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self, ticker: &str) -> Result<MarketSnapshot>;
}

#[async_trait]
impl SnapshotSource for YahooFinanceClient {
    async fn snapshot(&self, ticker: &str) -> Result<MarketSnapshot> {
        let quote = self.get_quote(ticker).await?;
        Ok(MarketSnapshot {
            price: Some(quote.close),
            ..MarketSnapshot::new(ticker)
        }
        .detail("Day Range", format!("{:.2} - {:.2}", quote.low, quote.high))
        .detail("Volume", grouped(quote.volume as f64))
        .detail("As Of", quote.timestamp.format("%Y-%m-%d %H:%M UTC").to_string()))
    }
}

#[async_trait]
impl SnapshotSource for CoinMarketCapClient {
    async fn snapshot(&self, ticker: &str) -> Result<MarketSnapshot> {
        let symbol = ticker.to_uppercase();
        let response = self.quotes_latest(&symbol).await?;
        let coin = response
            .get("data")
            .and_then(|d| d.get(&symbol))
            .ok_or_else(|| ResearchError::DataUnavailable {
                symbol: symbol.clone(),
                reason: "not listed on CoinMarketCap".to_string(),
            })?;
        let quote = &coin["quote"]["USD"];
        let field = |key: &str| quote.get(key).and_then(number).unwrap_or(0.0);

        Ok(MarketSnapshot {
            name: coin.get("name").and_then(|n| n.as_str()).map(str::to_string),
            price: quote.get("price").and_then(number),
            ..MarketSnapshot::new(symbol)
        }
        .detail("Market Cap", format!("${}", grouped(field("market_cap"))))
        .detail("24h Volume", format!("${}", grouped(field("volume_24h"))))
        .detail("24h Change", format!("{:.2}%", field("percent_change_24h"))))
    }
}

#[async_trait]
impl SnapshotSource for KrakenClient {
    async fn snapshot(&self, ticker: &str) -> Result<MarketSnapshot> {
        let symbol = ticker.to_uppercase();
        let pair = format!("{symbol}USD");
        let ticker = self
            .ticker(&pair)
            .await?
            .ok_or_else(|| ResearchError::DataUnavailable {
                symbol: symbol.clone(),
                reason: format!("Kraken has no pair {pair}"),
            })?;
        let field = |key: &str, index: usize| {
            ticker
                .data
                .get(key)
                .and_then(|v| v.get(index))
                .and_then(number)
        };
        let mut snapshot = MarketSnapshot {
            price: field("c", 0),
            ..MarketSnapshot::new(symbol)
        };
        if let (Some(low), Some(high)) = (field("l", 1), field("h", 1)) {
            snapshot = snapshot.detail("24h Range", format!("{low:.2} - {high:.2}"));
        }
        if let Some(volume) = field("v", 1) {
            snapshot = snapshot.detail("24h Volume", grouped(volume));
        }
        Ok(snapshot)
    }
}

/// Outcome of refreshing one collection
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateReport {
    pub collection: String,
    pub updated: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Store a snapshot of every ticker in `domain`'s collection.
///
/// Per-ticker failures are logged and recorded, never propagated.
pub async fn update_collection(
    store: &KnowledgeStore,
    domain: Domain,
    source: &dyn SnapshotSource,
    tickers: &[&str],
) -> UpdateReport {
    let collection = domain.collection();
    let date = Local::now().format("%Y-%m-%d").to_string();
    let mut report = UpdateReport {
        collection: collection.clone(),
        ..UpdateReport::default()
    };

    for &ticker in tickers {
        let result = match source.snapshot(ticker).await {
            Ok(snapshot) => store
                .save(&collection, &snapshot.entry_text(&date), Some("market-data-update"))
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                tracing::info!(collection = %collection, ticker, "Updated knowledge base");
                report.updated.push(ticker.to_string());
            }
            Err(e) => {
                tracing::error!(collection = %collection, ticker, error = %e, "Failed to update ticker");
                report.failed.push((ticker.to_string(), e.to_string()));
            }
        }
    }
    report
}
