//! Market data and research tools for FinWiz crews
//!
//! This crate gives the crews everything they can look up:
//!
//! - Stock and ETF quotes, history and news (Yahoo Finance)
//! - Company overviews and ETF holdings (Alpha Vantage, rate limited)
//! - Crypto quotes, listings, history and news (CoinMarketCap, Kraken)
//! - Web search, news and page scraping (Serper, Firecrawl)
//! - Reading crew reports and standardizing JSON recommendations
//! - Per-domain knowledge collections and their periodic refresh
//!
//! # Example
//!
//! ```rust,ignore
//! use finwiz_core::Domain;
//! use finwiz_research::{ResearchConfig, ResearchToolkit};
//!
//! let toolkit = ResearchToolkit::new(ResearchConfig::from_env()?)?;
//! let registry = toolkit.registry_for(Domain::Crypto);
//! let ticker = registry
//!     .invoke("kraken_ticker", serde_json::json!({"pair": "XBTUSD"}))
//!     .await;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod knowledge;
pub mod tools;
pub mod toolsets;
pub mod update;

pub use cache::{CacheKey, CacheManager, ResponseCache};
pub use config::{Endpoints, ResearchConfig, ResearchConfigBuilder};
pub use error::{ResearchError, Result};
pub use knowledge::{KnowledgeEntry, KnowledgeStore, ScoredEntry};
pub use toolsets::ResearchToolkit;
pub use update::{MarketSnapshot, SnapshotSource, UpdateReport, default_tickers, update_collection};
