//! # github-crawler
//!
//! A crawler for the GitHub search page.
//!
//! Given keywords, a result type and a pool of forward proxies, it fetches the
//! first search results page and returns the result links. Repository results
//! are enriched with their owner and language composition, read concurrently
//! from each repository page. The library is built around:
//!
//! - Proxy rotation with uniform random selection per request
//! - A retry budget that only retries transport failures
//! - Telling an empty result page apart from a page whose layout changed
//! - Replaceable CSS markers, so markup changes do not touch the extraction code
//!
//! ## Example
//!
//! ```rust,no_run
//! use github_crawler::GithubCrawler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let crawler = GithubCrawler::from_file("input.json")?;
//!     let results = crawler.run().await;
//!     println!("{}", serde_json::to_string_pretty(&results)?);
//!     Ok(())
//! }
//! ```

mod crawler;
mod error;
mod kind;
mod request;
mod result;

pub mod config;
pub mod enricher;
pub mod extractor;
pub mod fetcher;
pub mod fetcher_http;
pub mod proxy;
pub mod selectors;

pub use config::CrawlerConfig;
pub use crawler::GithubCrawler;
pub use error::{CrawlerError, Result};
pub use fetcher::PageFetcher;
pub use kind::{ResultKind, VALID_TYPES};
pub use request::SearchRequest;
pub use result::{
    CrawlRecord, CrawlResults, LanguageStats, RepositoryExtra, RepositoryRecord,
    NOT_FOUND_MESSAGE, NO_LANGUAGE_DATA,
};
pub use selectors::SelectorTable;
