//! Web search, news and page scraping tools

use crate::api::{FirecrawlClient, SearchKind, SerperClient};
use crate::cache::{CacheKey, ResponseCache};
use crate::error::ResearchError;
use async_trait::async_trait;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};

fn text<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Numbered markdown list of search hits
pub fn format_results(query: &str, results: &[Value]) -> String {
    if results.is_empty() {
        return format!("No results found for '{query}'.");
    }

    let mut out = format!("Search results for '{query}':\n\n");
    for (i, item) in results.iter().enumerate() {
        let title = text(item, "title").unwrap_or("Untitled");
        out.push_str(&format!("{}. {title}\n", i + 1));
        let meta: Vec<&str> = ["source", "date"]
            .iter()
            .filter_map(|key| text(item, key))
            .collect();
        if !meta.is_empty() {
            out.push_str(&format!("   {}\n", meta.join(" | ")));
        }
        if let Some(snippet) = text(item, "snippet").or_else(|| text(item, "description")) {
            out.push_str(&format!("   {snippet}\n"));
        }
        if let Some(link) = text(item, "link").or_else(|| text(item, "url")) {
            out.push_str(&format!("   {link}\n"));
        }
        out.push('\n');
    }
    out
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default)]
    n_results: Option<usize>,
}

/// Google search or news through Serper
pub struct WebSearchTool {
    client: SerperClient,
    kind: SearchKind,
    cache: ResponseCache,
    default_results: usize,
}

impl WebSearchTool {
    pub const SEARCH_NAME: &'static str = "web_search";
    pub const NEWS_NAME: &'static str = "web_news";

    pub fn new(client: SerperClient, kind: SearchKind, cache: ResponseCache, default_results: usize) -> Self {
        Self {
            client,
            kind,
            cache,
            default_results,
        }
    }

    fn tool_name(&self) -> &'static str {
        match self.kind {
            SearchKind::Search => Self::SEARCH_NAME,
            SearchKind::News => Self::NEWS_NAME,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let name = self.tool_name();
        let params: SearchParams = super::parse_params(name, params)?;
        let query = params.query.trim().to_string();
        if query.is_empty() {
            return Err(finwiz_core::Error::tool(name, "query must not be empty"));
        }
        let num = params.n_results.unwrap_or(self.default_results).max(1);

        let key = CacheKey::new("serper", name, &json!({ "q": query, "num": num }));
        let results = self
            .cache
            .get_or_fetch(key, || async {
                let items = self.client.query(self.kind, &query, num).await?;
                Ok::<_, ResearchError>(Value::Array(items))
            })
            .await
            .map_err(|e| super::tool_error(name, e))?;

        let items = results.as_array().map(Vec::as_slice).unwrap_or_default();
        Ok(json!(format_results(&query, items)))
    }

    fn name(&self) -> &str {
        self.tool_name()
    }

    fn description(&self) -> &str {
        match self.kind {
            SearchKind::Search => {
                "Search the web with Google. Returns titles, snippets and links."
            }
            SearchKind::News => {
                "Search recent news articles with Google News. Returns titles, sources, \
                 dates and links."
            }
        }
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "n_results": {"type": "integer", "description": "Number of results"}
            },
            "required": ["query"]
        })
    }
}

#[derive(Debug, Deserialize)]
struct FirecrawlSearchParams {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    25
}

/// Web search through Firecrawl
pub struct FirecrawlSearchTool {
    client: FirecrawlClient,
    cache: ResponseCache,
}

impl FirecrawlSearchTool {
    pub const NAME: &'static str = "firecrawl_search";

    pub fn new(client: FirecrawlClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for FirecrawlSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: FirecrawlSearchParams = super::parse_params(Self::NAME, params)?;
        let query = params.query.trim().to_string();
        let limit = params.limit.max(1);

        let key = CacheKey::new("firecrawl", "search", &json!({ "query": query, "limit": limit }));
        let results = self
            .cache
            .get_or_fetch(key, || async {
                let items = self.client.search(&query, limit).await?;
                Ok::<_, ResearchError>(Value::Array(items))
            })
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?;

        let items = results.as_array().map(Vec::as_slice).unwrap_or_default();
        Ok(json!(format_results(&query, items)))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search the web with Firecrawl and return matching pages with descriptions."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "limit": {"type": "integer", "default": 25}
            },
            "required": ["query"]
        })
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeParams {
    url: String,
}

/// Fetch a web page as markdown through Firecrawl
pub struct FirecrawlScrapeTool {
    client: FirecrawlClient,
}

impl FirecrawlScrapeTool {
    pub const NAME: &'static str = "firecrawl_scrape";

    pub fn new(client: FirecrawlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for FirecrawlScrapeTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: ScrapeParams = super::parse_params(Self::NAME, params)?;
        let page = self
            .client
            .scrape(params.url.trim())
            .await
            .map_err(|e| super::tool_error(Self::NAME, e))?;

        let body = match page.title {
            Some(title) => format!("# {title}\n\n{}", page.markdown),
            None => page.markdown,
        };
        Ok(json!(body))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Scrape a web page and return its main content as markdown."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "Page URL"}
            },
            "required": ["url"]
        })
    }
}
