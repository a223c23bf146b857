//! Validated, immutable search request.

use std::time::Duration;

use crate::fetcher_http::DEFAULT_USER_AGENT;
use crate::proxy::ProxyEndpoint;
use crate::{CrawlerError, Result, ResultKind, SelectorTable};

/// Number of attempts used when none is configured.
pub const DEFAULT_ATTEMPTS: u32 = 20;

/// Upper bound on repository pages fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Per-request timeout of the HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Site the search page and result links live on.
pub const DEFAULT_BASE_URL: &str = "https://github.com";

/// Everything needed to run one search.
///
/// Built once and never modified: the constructor rejects empty keyword and
/// proxy lists, and the `with_*` methods only run before the request is handed
/// to a crawler.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    keywords: Vec<String>,
    proxies: Vec<ProxyEndpoint>,
    kind: ResultKind,
    attempts: u32,
    retry_interval: Duration,
    concurrency: usize,
    timeout: Duration,
    user_agent: String,
    base_url: String,
    selectors: SelectorTable,
}

impl SearchRequest {
    /// Creates a request with default tuning.
    pub fn new(
        keywords: Vec<String>,
        proxies: Vec<ProxyEndpoint>,
        kind: ResultKind,
    ) -> Result<Self> {
        if keywords.is_empty() {
            return Err(CrawlerError::MissingKeywords);
        }
        if proxies.is_empty() {
            return Err(CrawlerError::MissingProxies);
        }

        Ok(Self {
            keywords,
            proxies,
            kind,
            attempts: DEFAULT_ATTEMPTS,
            retry_interval: Duration::ZERO,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            selectors: SelectorTable::default(),
        })
    }

    /// Sets the attempt budget. Zero is raised to one.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Sets the pause between attempts.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Sets the enrichment concurrency bound. Zero is raised to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the site base URL (scheme and host, no trailing slash needed).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the selector table.
    pub fn with_selectors(mut self, selectors: SelectorTable) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn proxies(&self) -> &[ProxyEndpoint] {
        &self.proxies
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn selectors(&self) -> &SelectorTable {
        &self.selectors
    }

    /// Builds the search page URL.
    ///
    /// Keywords are URL-encoded and joined with `+`, e.g.
    /// `https://github.com/search?q=Python+Java&type=Repositories`.
    pub fn search_url(&self) -> String {
        let query = self
            .keywords
            .iter()
            .map(|keyword| urlencoding::encode(keyword))
            .collect::<Vec<_>>()
            .join("+");

        format!("{}/search?q={}&type={}", self.base_url, query, self.kind)
    }
}
