//! Crawl result types.
//!
//! The serialized shape of these types is the crawler's output contract:
//!
//! - `[{"error": "..."}]`
//! - `[{"url_not_found": "Not found any URL for this search."}]`
//! - `[{"url": "..."}, ...]`
//! - `[{"url": "...", "extra": {"owner": "...", "language_stats": ...}}, ...]`

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Message carried by the record returned for a search without results.
pub const NOT_FOUND_MESSAGE: &str = "Not found any URL for this search.";

/// Value of `language_stats` when a repository page has no language widget.
pub const NO_LANGUAGE_DATA: &str = "Not data about languages";

/// Language composition of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageStats {
    /// Language name to percentage (without the `%`), in page order.
    Languages(Vec<(String, String)>),
    /// The repository page shows no language statistics.
    NoData,
    /// The repository page could not be fetched.
    Error(String),
}

impl LanguageStats {
    /// Returns the percentage recorded for a language, if any.
    pub fn percentage(&self, language: &str) -> Option<&str> {
        match self {
            LanguageStats::Languages(stats) => stats
                .iter()
                .find(|(name, _)| name == language)
                .map(|(_, pct)| pct.as_str()),
            _ => None,
        }
    }
}

impl Serialize for LanguageStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LanguageStats::Languages(stats) => {
                let mut map = serializer.serialize_map(Some(stats.len()))?;
                for (language, percentage) in stats {
                    map.serialize_entry(language, percentage)?;
                }
                map.end()
            }
            LanguageStats::NoData => serializer.serialize_str(NO_LANGUAGE_DATA),
            LanguageStats::Error(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

/// Metadata attached to a repository result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryExtra {
    pub owner: String,
    pub language_stats: LanguageStats,
}

/// A repository result enriched with data from its own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRecord {
    pub url: String,
    pub extra: RepositoryExtra,
}

impl RepositoryRecord {
    pub fn new(url: impl Into<String>, owner: impl Into<String>, stats: LanguageStats) -> Self {
        Self {
            url: url.into(),
            extra: RepositoryExtra {
                owner: owner.into(),
                language_stats: stats,
            },
        }
    }
}

/// A single entry of the crawler output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CrawlRecord {
    /// Issue or wiki result.
    Link { url: String },
    /// Repository result.
    Repository(RepositoryRecord),
    /// The search returned no results.
    NotFound { url_not_found: String },
    /// The crawl failed.
    Error { error: String },
}

impl CrawlRecord {
    /// Returns the URL of a link or repository record.
    pub fn url(&self) -> Option<&str> {
        match self {
            CrawlRecord::Link { url } => Some(url.as_str()),
            CrawlRecord::Repository(record) => Some(record.url.as_str()),
            _ => None,
        }
    }
}

/// The outcome of a crawl.
///
/// Holds exactly one error record, exactly one not-found record, or a
/// non-empty list of link/repository records. The constructors are the only
/// way to build one, so a mix is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CrawlResults {
    records: Vec<CrawlRecord>,
}

impl CrawlResults {
    /// A failed crawl.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            records: vec![CrawlRecord::Error {
                error: message.into(),
            }],
        }
    }

    /// A search that legitimately returned nothing.
    pub fn not_found() -> Self {
        Self {
            records: vec![CrawlRecord::NotFound {
                url_not_found: NOT_FOUND_MESSAGE.to_string(),
            }],
        }
    }

    /// Issue or wiki links in page order. An empty list means not found.
    pub fn links(urls: Vec<String>) -> Self {
        if urls.is_empty() {
            return Self::not_found();
        }
        Self {
            records: urls.into_iter().map(|url| CrawlRecord::Link { url }).collect(),
        }
    }

    /// Enriched repositories. An empty list means not found.
    pub fn repositories(records: Vec<RepositoryRecord>) -> Self {
        if records.is_empty() {
            return Self::not_found();
        }
        Self {
            records: records.into_iter().map(CrawlRecord::Repository).collect(),
        }
    }

    /// Returns the records.
    pub fn items(&self) -> &[CrawlRecord] {
        &self.records
    }

    /// Consumes the results, returning the records.
    pub fn into_records(self) -> Vec<CrawlRecord> {
        self.records
    }

    /// Returns the error message if the crawl failed.
    pub fn error_message(&self) -> Option<&str> {
        match self.records.as_slice() {
            [CrawlRecord::Error { error }] => Some(error.as_str()),
            _ => None,
        }
    }

    /// Whether the crawl failed.
    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }

    /// Whether the search returned no results.
    pub fn is_not_found(&self) -> bool {
        matches!(self.records.as_slice(), [CrawlRecord::NotFound { .. }])
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: every outcome carries at least one record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
