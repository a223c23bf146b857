//! Crawl orchestration.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::enricher::Enricher;
use crate::extractor::{absolute_url, Extraction, Extractor};
use crate::fetcher::PageFetcher;
use crate::fetcher_http::HttpFetcher;
use crate::{CrawlResults, CrawlerError, Result, SearchRequest};

/// Where an attempt cycle stands after one fetch and extract.
#[derive(Debug)]
enum CrawlState {
    /// A transient failure left budget for another attempt.
    Retrying { remaining: u32, error: CrawlerError },
    /// The crawl ended, successfully or not.
    Done(CrawlResults),
}

/// GitHub search crawler.
///
/// Fetches the search page for a request, extracts the result links and, for
/// repository searches, enriches each one from its own page.
pub struct GithubCrawler {
    request: SearchRequest,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Extractor,
    enricher: Enricher,
}

impl GithubCrawler {
    /// Creates a crawler that fetches pages through the request's proxies.
    pub fn new(request: SearchRequest) -> Result<Self> {
        let fetcher = HttpFetcher::with_user_agent(
            request.proxies(),
            request.user_agent(),
            request.timeout(),
        )?;
        Ok(Self::with_fetcher(request, Arc::new(fetcher)))
    }

    /// Creates a crawler from a JSON input file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(SearchRequest::from_file(path)?)
    }

    /// Creates a crawler that uses a custom page fetcher.
    pub fn with_fetcher(request: SearchRequest, fetcher: Arc<dyn PageFetcher>) -> Self {
        let extractor = Extractor::new(request.selectors().clone());
        let enricher = Enricher::from_request(Arc::clone(&fetcher), &request);
        Self {
            request,
            fetcher,
            extractor,
            enricher,
        }
    }

    /// Returns the request this crawler runs.
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Returns the search page URL.
    pub fn search_url(&self) -> String {
        self.request.search_url()
    }

    /// Runs the crawl.
    ///
    /// Never fails: transport failures are retried until the attempt budget
    /// runs out, layout changes end the crawl at once, and either way the
    /// failure is returned as an error record.
    pub async fn run(&self) -> CrawlResults {
        let url = self.search_url();
        let total = self.request.attempts();
        let mut remaining = total;

        info!("SEARCHING: {}", url);

        loop {
            match self.attempt(&url, remaining).await {
                CrawlState::Done(results) => {
                    info!("Result after {} attempts.", total - remaining);
                    return results;
                }
                CrawlState::Retrying {
                    remaining: left,
                    error,
                } => {
                    if left == 0 {
                        warn!("FAIL after {} attempts.", total);
                        return CrawlResults::error(error.to_string());
                    }
                    remaining = left;
                    let interval = self.request.retry_interval();
                    if !interval.is_zero() {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }
    }

    /// One fetch and extract of the search page.
    async fn attempt(&self, url: &str, remaining: u32) -> CrawlState {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => return self.failed(e, remaining),
        };

        let kind = self.request.kind();
        match self.extractor.extract(&html, kind) {
            Ok(Extraction::Empty) => CrawlState::Done(CrawlResults::not_found()),
            Ok(Extraction::Links(links)) if kind.needs_enrichment() => {
                CrawlState::Done(CrawlResults::repositories(self.enricher.enrich(&links).await))
            }
            Ok(Extraction::Links(links)) => {
                let base_url = self.request.base_url();
                match links
                    .iter()
                    .map(|link| absolute_url(base_url, link))
                    .collect::<Result<Vec<_>>>()
                {
                    Ok(urls) => CrawlState::Done(CrawlResults::links(urls)),
                    Err(e) => self.failed(e, remaining),
                }
            }
            Err(e) => self.failed(e, remaining),
        }
    }

    fn failed(&self, error: CrawlerError, remaining: u32) -> CrawlState {
        warn!("ERROR: {}", error);
        if error.is_retryable() {
            let remaining = remaining.saturating_sub(1);
            debug!("{} attempts left", remaining);
            CrawlState::Retrying { remaining, error }
        } else {
            CrawlState::Done(CrawlResults::error(error.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use super::*;
    use crate::proxy::ProxyEndpoint;
    use crate::result::{CrawlRecord, LanguageStats, RepositoryRecord};
    use crate::ResultKind;

    const SEARCH_URL: &str = "https://github.com/search?q=Python+Java&type=";

    const REPOSITORIES_PAGE: &str = r#"
        <ul class="repo-list">
            <li><a class="v-align-middle" href="/qiyuangong/leetcode">qiyuangong/leetcode</a></li>
            <li><a class="v-align-middle" href="/itwanger/JavaBooks">itwanger/JavaBooks</a></li>
        </ul>
    "#;

    const ISSUES_PAGE: &str = r#"
        <div><a class="Link--muted text-bold" href="/keshavsingh4522/hacktoberfest2021/issues">a</a></div>
        <div><a class="Link--muted text-bold" href="/amisha-28/Hacktoberfest2021/issues">b</a></div>
    "#;

    const WIKIS_PAGE: &str = r#"
        <div><a class="Link--muted text-small text-bold" href="/Ignat99/msp">Ignat99/msp</a></div>
        <div><a class="Link--muted text-small text-bold" href="/oeli/yafra">oeli/yafra</a></div>
    "#;

    const NO_RESULTS_PAGE: &str = r#"<div class="blankslate"><h3>No results</h3></div>"#;

    const DRIFTED_PAGE: &str = r#"<div class="search-v3"><a href="/x/y">x/y</a></div>"#;

    const STATS_PAGE: &str = r#"
        <li class="d-inline"><span>Python</span><span>77.4%</span></li>
        <li class="d-inline"><span>Java</span><span>20.4%</span></li>
        <li class="d-inline"><span>C++</span><span>2.2%</span></li>
    "#;

    /// Fails the first `failures` fetches of any URL, then serves from memory.
    struct ScriptedFetcher {
        pages: HashMap<String, String>,
        failures: usize,
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<(String, &str)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(url, html)| (url, html.to_string()))
                    .collect(),
                failures: 0,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn failing_first(mut self, failures: usize) -> Self {
            self.failures = failures;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.urls.lock().unwrap().push(url.to_string());
            if call <= self.failures {
                return Err(CrawlerError::Network(format!("proxy refused (call {})", call)));
            }
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| CrawlerError::Network(format!("unexpected url {}", url)))
        }
    }

    fn request(kind: ResultKind, attempts: u32) -> SearchRequest {
        SearchRequest::new(
            vec!["Python".to_string(), "Java".to_string()],
            vec![ProxyEndpoint::new("127.0.0.1", 8080)],
            kind,
        )
        .unwrap()
        .with_attempts(attempts)
    }

    fn search_url(kind: ResultKind) -> String {
        format!("{}{}", SEARCH_URL, kind)
    }

    fn crawler(kind: ResultKind, attempts: u32, fetcher: Arc<ScriptedFetcher>) -> GithubCrawler {
        GithubCrawler::with_fetcher(request(kind, attempts), fetcher)
    }

    #[test]
    fn test_new_builds_http_fetcher() {
        let crawler = GithubCrawler::new(request(ResultKind::Issues, 3)).unwrap();
        assert_eq!(crawler.request().attempts(), 3);
        assert_eq!(crawler.search_url(), search_url(ResultKind::Issues));
    }

    #[tokio::test]
    async fn test_run_issues() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![(
            search_url(ResultKind::Issues),
            ISSUES_PAGE,
        )]));
        let results = crawler(ResultKind::Issues, 3, fetcher).run().await;

        assert_eq!(
            results.into_records(),
            vec![
                CrawlRecord::Link {
                    url: "https://github.com/keshavsingh4522/hacktoberfest2021/issues".to_string()
                },
                CrawlRecord::Link {
                    url: "https://github.com/amisha-28/Hacktoberfest2021/issues".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_run_wikis() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![(
            search_url(ResultKind::Wikis),
            WIKIS_PAGE,
        )]));
        let results = crawler(ResultKind::Wikis, 3, fetcher).run().await;

        let urls: Vec<_> = results.items().iter().filter_map(|r| r.url()).collect();
        assert_eq!(
            urls,
            vec!["https://github.com/Ignat99/msp", "https://github.com/oeli/yafra"]
        );
    }

    #[tokio::test]
    async fn test_run_repositories_enriches_each_link() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            (search_url(ResultKind::Repositories), REPOSITORIES_PAGE),
            ("https://github.com/qiyuangong/leetcode".to_string(), STATS_PAGE),
            ("https://github.com/itwanger/JavaBooks".to_string(), "<html></html>"),
        ]));
        let results = crawler(ResultKind::Repositories, 3, fetcher.clone()).run().await;

        assert_eq!(results.len(), 2);
        assert_eq!(fetcher.calls(), 3);

        let records: HashMap<String, RepositoryRecord> = results
            .into_records()
            .into_iter()
            .map(|r| match r {
                CrawlRecord::Repository(record) => (record.url.clone(), record),
                other => panic!("unexpected record {:?}", other),
            })
            .collect();

        assert_eq!(
            records["https://github.com/qiyuangong/leetcode"],
            RepositoryRecord::new(
                "https://github.com/qiyuangong/leetcode",
                "qiyuangong",
                LanguageStats::Languages(vec![
                    ("Python".to_string(), "77.4".to_string()),
                    ("Java".to_string(), "20.4".to_string()),
                    ("C++".to_string(), "2.2".to_string()),
                ])
            )
        );
        assert_eq!(
            records["https://github.com/itwanger/JavaBooks"].extra.language_stats,
            LanguageStats::NoData
        );
    }

    #[tokio::test]
    async fn test_run_no_results() {
        for kind in ResultKind::ALL {
            let fetcher = Arc::new(ScriptedFetcher::new(vec![(search_url(kind), NO_RESULTS_PAGE)]));
            let results = crawler(kind, 3, fetcher.clone()).run().await;

            assert_eq!(
                serde_json::to_value(&results).unwrap(),
                serde_json::json!([{"url_not_found": "Not found any URL for this search."}])
            );
            assert_eq!(fetcher.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_run_drifted_layout_is_not_retried() {
        for kind in ResultKind::ALL {
            let fetcher = Arc::new(ScriptedFetcher::new(vec![(search_url(kind), DRIFTED_PAGE)]));
            let results = crawler(kind, 5, fetcher.clone()).run().await;

            assert_eq!(
                serde_json::to_value(&results).unwrap(),
                serde_json::json!([{"error": "Data not found. Github HTML may have changed."}])
            );
            assert_eq!(fetcher.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_run_marker_without_href_is_not_retried() {
        let pages = [
            (ResultKind::Repositories, r#"<a class="v-align-middle">kivy/pyjnius</a>"#),
            (ResultKind::Issues, r#"<div><a class="Link--muted text-bold">issue</a></div>"#),
            (
                ResultKind::Wikis,
                r#"<div><a class="Link--muted text-small text-bold">wiki</a></div>"#,
            ),
        ];

        for (kind, page) in pages {
            let fetcher = Arc::new(ScriptedFetcher::new(vec![(search_url(kind), page)]));
            let results = crawler(kind, 5, fetcher.clone()).run().await;

            assert_eq!(
                results.error_message(),
                Some("Data not found. Github HTML may have changed.")
            );
            assert_eq!(fetcher.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_run_resolves_protocol_relative_links() {
        let page = r#"<div><a class="Link--muted text-bold" href="//gist.github.com/x">gist</a></div>"#;
        let fetcher = Arc::new(ScriptedFetcher::new(vec![(search_url(ResultKind::Issues), page)]));
        let results = crawler(ResultKind::Issues, 3, fetcher).run().await;

        let urls: Vec<_> = results.items().iter().filter_map(|r| r.url()).collect();
        assert_eq!(urls, vec!["https://gist.github.com/x"]);
    }

    #[tokio::test]
    async fn test_run_recovers_within_budget() {
        let attempts = 4;
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![(search_url(ResultKind::Issues), ISSUES_PAGE)])
                .failing_first(attempts as usize - 1),
        );
        let results = crawler(ResultKind::Issues, attempts, fetcher.clone()).run().await;

        assert!(!results.is_error());
        assert_eq!(results.len(), 2);
        assert_eq!(fetcher.calls(), attempts as usize);
    }

    #[tokio::test]
    async fn test_run_exhausted_budget_returns_last_error() {
        let attempts = 3;
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![(search_url(ResultKind::Issues), ISSUES_PAGE)])
                .failing_first(attempts as usize),
        );
        let results = crawler(ResultKind::Issues, attempts, fetcher.clone()).run().await;

        assert_eq!(results.error_message(), Some("proxy refused (call 3)"));
        assert_eq!(fetcher.calls(), attempts as usize);
    }

    #[tokio::test]
    async fn test_run_single_attempt_budget() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![(search_url(ResultKind::Wikis), WIKIS_PAGE)])
                .failing_first(1),
        );
        let results = crawler(ResultKind::Wikis, 1, fetcher.clone()).run().await;

        assert!(results.is_error());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_waits_retry_interval() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![(search_url(ResultKind::Issues), ISSUES_PAGE)])
                .failing_first(2),
        );
        let request = request(ResultKind::Issues, 3).with_retry_interval(Duration::from_millis(20));
        let crawler = GithubCrawler::with_fetcher(request, fetcher.clone());

        let start = Instant::now();
        let results = crawler.run().await;

        assert!(!results.is_error());
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_run_fetches_search_url() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![(
            search_url(ResultKind::Wikis),
            NO_RESULTS_PAGE,
        )]));
        crawler(ResultKind::Wikis, 1, fetcher.clone()).run().await;

        assert_eq!(
            *fetcher.urls.lock().unwrap(),
            vec!["https://github.com/search?q=Python+Java&type=Wikis".to_string()]
        );
    }
}
