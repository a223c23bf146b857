//! Input file loading and validation.
//!
//! The input is a JSON object:
//!
//! ```json
//! {
//!   "keywords": ["openstack", "nova", "css"],
//!   "proxies": ["194.126.37.94:8080", "13.78.125.167:8080"],
//!   "type": "Repositories"
//! }
//! ```
//!
//! Optional tuning fields (`attempts`, `retry_interval_ms`, `concurrency`,
//! `timeout_secs`, `user_agent`, `base_url`, `selectors`) fall back to
//! defaults when absent.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::fetcher_http::DEFAULT_USER_AGENT;
use crate::proxy::ProxyEndpoint;
use crate::request::{DEFAULT_ATTEMPTS, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use crate::{CrawlerError, Result, ResultKind, SearchRequest, SelectorTable};

/// Raw contents of the input file, before validation.
///
/// The required fields are optional here so that a missing field is reported
/// with the same error as an empty or invalid one.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub proxies: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default)]
    pub retry_interval_ms: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub selectors: SelectorTable,
}

fn default_attempts() -> u32 {
    DEFAULT_ATTEMPTS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl CrawlerConfig {
    /// Reads the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CrawlerError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_json(&contents)
    }

    /// Parses the configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the configuration and builds the request.
    ///
    /// Checks run in a fixed order (keywords, proxies, type, then tuning) so
    /// that the first problem found is the one reported.
    pub fn into_request(self) -> Result<SearchRequest> {
        let keywords = self
            .keywords
            .filter(|k| !k.is_empty())
            .ok_or(CrawlerError::MissingKeywords)?;

        let proxies = self
            .proxies
            .filter(|p| !p.is_empty())
            .ok_or(CrawlerError::MissingProxies)?;

        let kind: ResultKind = self
            .kind
            .as_ref()
            .and_then(Value::as_str)
            .ok_or(CrawlerError::InvalidType)?
            .parse()?;

        let proxies = proxies
            .iter()
            .map(|p| p.parse::<ProxyEndpoint>())
            .collect::<Result<Vec<_>>>()?;

        if self.attempts == 0 {
            return Err(CrawlerError::InvalidConfig(
                "attempts must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(CrawlerError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(CrawlerError::InvalidConfig(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            CrawlerError::InvalidConfig(format!("Invalid base_url '{}': {}", self.base_url, e))
        })?;
        self.selectors.validate()?;

        Ok(SearchRequest::new(keywords, proxies, kind)?
            .with_attempts(self.attempts)
            .with_retry_interval(Duration::from_millis(self.retry_interval_ms))
            .with_concurrency(self.concurrency)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_user_agent(self.user_agent)
            .with_base_url(self.base_url)
            .with_selectors(self.selectors))
    }
}

impl SearchRequest {
    /// Loads and validates a request from a JSON input file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        CrawlerConfig::from_file(path)?.into_request()
    }
}
