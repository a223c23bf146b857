//! Error types for the crawler.

use thiserror::Error;

use crate::kind::VALID_TYPES;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Errors that can occur while configuring or running a crawl.
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Keywords are missing or empty.
    #[error("Keyword missing.")]
    MissingKeywords,

    /// Proxies are missing or empty.
    #[error("Proxy missing.")]
    MissingProxies,

    /// Result type is missing or not one of the supported kinds.
    #[error("Type not valid. Has to be: {}", format_valid_types())]
    InvalidType,

    /// A proxy endpoint could not be turned into a usable proxy.
    #[error("Invalid proxy '{0}': {1}")]
    InvalidProxy(String, String),

    /// The configuration source could not be read or holds a bad value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request failed.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-reqwest fetcher.
    #[error("{0}")]
    Network(String),

    /// Neither the result markers nor the empty-result marker were found.
    #[error("Data not found. Github HTML may have changed.")]
    DataNotFound,
}

impl CrawlerError {
    /// Whether the failure is transient and the request may be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CrawlerError::Http(_) | CrawlerError::Network(_))
    }

    /// Whether the failure was raised while validating configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CrawlerError::MissingKeywords
                | CrawlerError::MissingProxies
                | CrawlerError::InvalidType
                | CrawlerError::InvalidProxy(..)
                | CrawlerError::InvalidConfig(_)
        )
    }
}

fn format_valid_types() -> String {
    let quoted: Vec<String> = VALID_TYPES.iter().map(|t| format!("'{}'", t)).collect();
    format!("[{}]", quoted.join(", "))
}

impl From<serde_json::Error> for CrawlerError {
    fn from(err: serde_json::Error) -> Self {
        CrawlerError::InvalidConfig(err.to_string())
    }
}
