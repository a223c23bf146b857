//! HTTP-based page fetcher routed through the proxy pool.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::fetcher::PageFetcher;
use crate::proxy::{ProxyEndpoint, ProxyPool};
use crate::Result;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; github-crawler/0.1)";

/// A page fetcher that sends every request through a randomly chosen proxy.
///
/// Response status codes are logged and otherwise passed through: an error
/// page from GitHub or from the proxy (502, 407) is returned as content and
/// judged by the extractor, and only transport failures reach the retry loop.
pub struct HttpFetcher {
    pool: ProxyPool,
}

impl HttpFetcher {
    /// Creates a fetcher over the given proxies with the default user agent.
    pub fn new(proxies: &[ProxyEndpoint], timeout: Duration) -> Result<Self> {
        Self::with_user_agent(proxies, DEFAULT_USER_AGENT, timeout)
    }

    /// Creates a fetcher with a custom user agent.
    pub fn with_user_agent(
        proxies: &[ProxyEndpoint],
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            pool: ProxyPool::new(proxies, user_agent, timeout)?,
        })
    }

    /// Returns the number of proxies requests are spread over.
    pub fn proxy_count(&self) -> usize {
        self.pool.len()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let (proxy, client) = self.pool.choose();
        let response = client.get(url).send().await?;
        debug!("GET {} via {} -> {}", url, proxy, response.status());
        let html = response.text().await?;
        Ok(html)
    }
}
