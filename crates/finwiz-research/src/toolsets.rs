//! Per-crew tool sets

use crate::api::{
    self, AlphaVantageClient, CoinMarketCapClient, FirecrawlClient, KrakenClient, SearchKind,
    SerperClient, YahooFinanceClient,
};
use crate::cache::CacheManager;
use crate::config::ResearchConfig;
use crate::error::Result;
use crate::knowledge::KnowledgeStore;
use crate::tools::{
    CoinMarketCapHistoricalTool, CoinMarketCapInfoTool, CoinMarketCapListTool,
    CoinMarketCapNewsTool, CompanyOverviewTool, DirectoryReadTool, EtfHoldingsTool,
    FirecrawlScrapeTool, FirecrawlSearchTool, JsonOutputTool, JsonParserTool, KrakenTickerTool,
    QueryKnowledgeTool, SaveKnowledgeTool, WebSearchTool, YahooHistoryTool, YahooNewsTool,
    YahooTickerInfoTool,
};
use crate::update::{self, SnapshotSource, UpdateReport};
use finwiz_core::Domain;
use finwiz_tools::{Tool, ToolRegistry};
use std::sync::Arc;

/// Clients, caches and the knowledge store shared by every crew's tools.
///
/// Tools needing an API key are always built. Without the key their calls
/// return an error string naming the missing variable.
#[derive(Clone)]
pub struct ResearchToolkit {
    config: ResearchConfig,
    caches: CacheManager,
    knowledge: KnowledgeStore,
    yahoo: YahooFinanceClient,
    alpha_vantage: AlphaVantageClient,
    coinmarketcap: CoinMarketCapClient,
    kraken: KrakenClient,
    serper: SerperClient,
    firecrawl: FirecrawlClient,
}

impl ResearchToolkit {
    pub fn new(config: ResearchConfig) -> Result<Self> {
        config.validate()?;
        let http = api::http_client(config.request_timeout)?;
        let kraken_http = api::http_client(config.kraken_timeout)?;
        let endpoints = &config.endpoints;

        Ok(Self {
            caches: CacheManager::from_config(&config),
            knowledge: KnowledgeStore::new(&config.knowledge_dir),
            yahoo: YahooFinanceClient::new(http.clone(), &endpoints.yahoo_search),
            alpha_vantage: AlphaVantageClient::new(
                http.clone(),
                &endpoints.alpha_vantage,
                config.alpha_vantage_api_key.clone(),
                config.alpha_vantage_rate_limit,
            ),
            coinmarketcap: CoinMarketCapClient::new(
                http.clone(),
                &endpoints.coinmarketcap,
                config.cmc_api_key.clone(),
            ),
            kraken: KrakenClient::new(kraken_http, &endpoints.kraken),
            serper: SerperClient::new(http.clone(), &endpoints.serper, config.serper_api_key.clone()),
            firecrawl: FirecrawlClient::new(http, &endpoints.firecrawl, config.firecrawl_api_key.clone()),
            config,
        })
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn caches(&self) -> &CacheManager {
        &self.caches
    }

    fn web_tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(WebSearchTool::new(
                self.serper.clone(),
                SearchKind::Search,
                self.caches.news.clone(),
                self.config.search_results,
            )) as Arc<dyn Tool>,
            Arc::new(WebSearchTool::new(
                self.serper.clone(),
                SearchKind::News,
                self.caches.news.clone(),
                self.config.search_results,
            )),
            Arc::new(FirecrawlSearchTool::new(self.firecrawl.clone(), self.caches.news.clone())),
            Arc::new(FirecrawlScrapeTool::new(self.firecrawl.clone())),
        ]
    }

    fn market_tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(YahooTickerInfoTool::new(self.yahoo.clone(), self.caches.realtime.clone()))
                as Arc<dyn Tool>,
            Arc::new(YahooHistoryTool::new(self.yahoo.clone(), self.caches.fundamental.clone())),
            Arc::new(YahooNewsTool::new(self.yahoo.clone(), self.caches.news.clone())),
            Arc::new(CompanyOverviewTool::new(
                self.alpha_vantage.clone(),
                self.caches.fundamental.clone(),
            )),
            Arc::new(EtfHoldingsTool::new(
                self.alpha_vantage.clone(),
                self.caches.fundamental.clone(),
            )),
        ]
    }

    fn crypto_tools(&self) -> Vec<Arc<dyn Tool>> {
        let cmc = &self.coinmarketcap;
        vec![
            Arc::new(KrakenTickerTool::new(self.kraken.clone(), self.caches.realtime.clone()))
                as Arc<dyn Tool>,
            Arc::new(CoinMarketCapInfoTool::new(cmc.clone(), self.caches.realtime.clone())),
            Arc::new(CoinMarketCapListTool::new(cmc.clone(), self.caches.realtime.clone())),
            Arc::new(CoinMarketCapHistoricalTool::new(cmc.clone(), self.caches.fundamental.clone())),
            Arc::new(CoinMarketCapNewsTool::new(cmc.clone(), self.caches.news.clone())),
        ]
    }

    fn knowledge_tools(&self, domain: Domain) -> Vec<Arc<dyn Tool>> {
        let collection = domain.collection();
        vec![
            Arc::new(QueryKnowledgeTool::new(self.knowledge.clone(), collection.clone()))
                as Arc<dyn Tool>,
            Arc::new(SaveKnowledgeTool::new(self.knowledge.clone(), collection)),
        ]
    }

    /// Tools available to `domain`'s crew
    pub fn tools_for(&self, domain: Domain) -> Vec<Arc<dyn Tool>> {
        let mut tools = match domain {
            Domain::Stock | Domain::Etf => {
                let mut tools = self.web_tools();
                tools.extend(self.market_tools());
                tools
            }
            Domain::Crypto => {
                let mut tools = self.crypto_tools();
                tools.extend(self.web_tools());
                tools
            }
            Domain::Report => vec![
                Arc::new(DirectoryReadTool::new(&self.config.output_root)) as Arc<dyn Tool>,
                Arc::new(JsonOutputTool::new()),
                Arc::new(JsonParserTool::new()),
            ],
        };
        tools.extend(self.knowledge_tools(domain));
        tools
    }

    /// Registry holding [`Self::tools_for`]
    pub fn registry_for(&self, domain: Domain) -> Arc<ToolRegistry> {
        let registry = ToolRegistry::from_tools(self.tools_for(domain));
        tracing::debug!(domain = %domain, tools = ?registry.names(), "Built tool registry");
        Arc::new(registry)
    }

    /// Snapshot source for a domain's knowledge refresh.
    ///
    /// Crypto uses CoinMarketCap when its key is configured, Kraken otherwise.
    pub fn snapshot_source(&self, domain: Domain) -> &dyn SnapshotSource {
        match domain {
            Domain::Crypto if self.config.cmc_api_key.is_some() => {
                &self.coinmarketcap as &dyn SnapshotSource
            }
            Domain::Crypto => &self.kraken,
            _ => &self.yahoo,
        }
    }

    /// Refresh every domain collection with its default tickers
    pub async fn update_knowledge(&self) -> Vec<UpdateReport> {
        let mut reports = Vec::new();
        for domain in [Domain::Stock, Domain::Etf, Domain::Crypto] {
            let report = update::update_collection(
                &self.knowledge,
                domain,
                self.snapshot_source(domain),
                update::default_tickers(domain),
            )
            .await;
            reports.push(report);
        }
        reports
    }
}
