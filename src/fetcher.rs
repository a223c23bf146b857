//! Page fetcher abstraction for retrieving HTML content.

use async_trait::async_trait;

use crate::Result;

/// Trait for fetching the full HTML content of a URL.
///
/// Implementations are pure transport: they neither retry nor look at the
/// content. Transient failures are reported as errors for which
/// [`CrawlerError::is_retryable`](crate::CrawlerError::is_retryable) holds, so
/// the caller can decide whether to try again.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the HTML content of the given URL.
    async fn fetch(&self, url: &str) -> Result<String>;
}
