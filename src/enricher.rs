//! Repository enrichment: owner and language statistics.
//!
//! Every repository link is enriched by its own task. Tasks run concurrently
//! up to a configured bound and share nothing but the fetcher; a task that
//! cannot reach its repository page resolves to an error payload for its own
//! record and leaves the others untouched.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use scraper::Html;
use tracing::{debug, warn};

use crate::extractor::absolute_url;
use crate::fetcher::PageFetcher;
use crate::request::{DEFAULT_ATTEMPTS, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY};
use crate::result::{LanguageStats, RepositoryRecord};
use crate::selectors::Concern;
use crate::{Result, ResultKind, SearchRequest, SelectorTable};

/// Builds repository records from repository links.
pub struct Enricher {
    fetcher: Arc<dyn PageFetcher>,
    selectors: SelectorTable,
    base_url: String,
    attempts: u32,
    concurrency: usize,
}

impl Enricher {
    /// Creates an enricher with default selectors and tuning.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            selectors: SelectorTable::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            attempts: DEFAULT_ATTEMPTS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Creates an enricher tuned by a search request.
    pub fn from_request(fetcher: Arc<dyn PageFetcher>, request: &SearchRequest) -> Self {
        Self {
            fetcher,
            selectors: request.selectors().clone(),
            base_url: request.base_url().to_string(),
            attempts: request.attempts(),
            concurrency: request.concurrency(),
        }
    }

    /// Sets the number of attempts per repository page.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Sets how many repository pages are fetched at the same time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enriches all links concurrently.
    ///
    /// Records come back in completion order, not link order.
    pub async fn enrich(&self, links: &[String]) -> Vec<RepositoryRecord> {
        debug!(
            "Enriching {} repositories ({} at a time)",
            links.len(),
            self.concurrency
        );

        stream::iter(links.iter().map(|link| self.enrich_one(link)))
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Builds the record for a single repository link.
    pub async fn enrich_one(&self, link: &str) -> RepositoryRecord {
        let owner = owner_of(link);
        let url = match absolute_url(&self.base_url, link) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping repository page {}: {}", link, e);
                return RepositoryRecord::new(link, owner, LanguageStats::Error(e.to_string()));
            }
        };
        debug!("Creating link to repository: {}", url);
        let stats = self.language_stats(&url).await;
        RepositoryRecord::new(url, owner, stats)
    }

    /// Fetches a repository page and reads its language statistics.
    ///
    /// Transport failures are retried up to the attempt budget, after which
    /// the last failure message becomes the error payload.
    pub async fn language_stats(&self, url: &str) -> LanguageStats {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetcher.fetch(url).await {
                Ok(html) => {
                    return parse_language_stats(&html, &self.selectors)
                        .unwrap_or_else(|e| LanguageStats::Error(e.to_string()));
                }
                Err(e) if e.is_retryable() && attempt < self.attempts => {
                    debug!("Attempt {} for {} failed: {}", attempt, url, e);
                }
                Err(e) => {
                    warn!("FAIL after {} attempts for {}: {}", attempt, url, e);
                    return LanguageStats::Error(e.to_string());
                }
            }
        }
    }
}

/// Returns the owner of a repository link: the first path segment.
pub fn owner_of(link: &str) -> String {
    let path = match url::Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.to_string(),
    };

    path.trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Reads the language statistics widget of a repository page.
///
/// Each statistics item holds inline parts. With two parts they are the
/// language and the percentage; with three the first one is skipped and the
/// other two are read the same way. The percentage loses its trailing unit
/// character. A page without statistics items yields `NoData`.
pub fn parse_language_stats(html: &str, selectors: &SelectorTable) -> Result<LanguageStats> {
    let document = Html::parse_document(html);
    let item_selector = selectors.compile(ResultKind::Repositories, Concern::Stats)?;
    let part_selector = selectors.compile(ResultKind::Repositories, Concern::StatsPart)?;

    let items: Vec<_> = document.select(&item_selector).collect();
    if items.is_empty() {
        return Ok(LanguageStats::NoData);
    }

    let mut stats = Vec::with_capacity(items.len());
    for item in items {
        let parts: Vec<String> = item
            .select(&part_selector)
            .map(|part| part.text().collect::<String>().trim().to_string())
            .collect();

        let (language, mut percentage) = match parts.as_slice() {
            [language, percentage] => (language.clone(), percentage.clone()),
            [_, language, percentage, ..] => (language.clone(), percentage.clone()),
            _ => {
                debug!("Skipping language item with {} parts", parts.len());
                continue;
            }
        };
        percentage.pop();
        stats.push((language, percentage));
    }

    Ok(LanguageStats::Languages(stats))
}
