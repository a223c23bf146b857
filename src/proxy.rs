//! Forward proxy pool with uniform random rotation.
//!
//! Every configured endpoint carries HTTP and HTTPS traffic alike. Callers
//! only ever ask the pool for "a client"; which proxy sits behind it is
//! decided per call.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Proxy as ReqwestProxy};
use tracing::debug;
use url::Url;

use crate::{CrawlerError, Result};

/// A single `host:port` proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyEndpoint {
    /// Proxy host (IP or domain)
    pub host: String,
    /// Proxy port
    pub port: u16,
}

impl ProxyEndpoint {
    /// Creates a new proxy endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the proxy URL string.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyEndpoint {
    type Err = CrawlerError;

    /// Parses a bare `host:port` endpoint. Credentials, paths, queries and
    /// scheme prefixes are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |reason: String| CrawlerError::InvalidProxy(s.to_string(), reason);

        let url = Url::parse(&format!("http://{}", s)).map_err(|e| invalid(e.to_string()))?;

        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials are not supported".to_string()));
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("expected host:port".to_string()));
        }

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| invalid("missing host".to_string()))?;
        if host.contains('%') {
            return Err(invalid("malformed host".to_string()));
        }
        // The default port is dropped by the parser, so an explicit `:80`
        // has to be read back from the input.
        let port = url
            .port()
            .or_else(|| explicit_port(s))
            .ok_or_else(|| invalid("missing port".to_string()))?;

        Ok(Self::new(host, port))
    }
}

fn explicit_port(s: &str) -> Option<u16> {
    let (_, port) = s.rsplit_once(':')?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse().ok()
}

struct PoolEntry {
    endpoint: ProxyEndpoint,
    client: Client,
}

/// A non-empty set of proxies, each with a ready-made HTTP client.
pub struct ProxyPool {
    entries: Vec<PoolEntry>,
}

impl ProxyPool {
    /// Builds one client per endpoint with the given user agent and timeout.
    pub fn new(endpoints: &[ProxyEndpoint], user_agent: &str, timeout: Duration) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(CrawlerError::MissingProxies);
        }

        let entries = endpoints
            .iter()
            .map(|endpoint| {
                let client = create_client(endpoint, user_agent, timeout)?;
                Ok(PoolEntry {
                    endpoint: endpoint.clone(),
                    client,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Returns the number of proxies in the pool.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: construction rejects an empty endpoint list.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks a proxy uniformly at random and returns its client.
    pub fn choose(&self) -> (&ProxyEndpoint, &Client) {
        let index = rand::thread_rng().gen_range(0..self.entries.len());
        let entry = &self.entries[index];
        debug!("Using proxy: {}", entry.endpoint);
        (&entry.endpoint, &entry.client)
    }
}

fn create_client(endpoint: &ProxyEndpoint, user_agent: &str, timeout: Duration) -> Result<Client> {
    let proxy = ReqwestProxy::all(endpoint.url())
        .map_err(|e| CrawlerError::InvalidProxy(endpoint.to_string(), e.to_string()))?;

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .proxy(proxy)
        .build()
        .map_err(|e| CrawlerError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))
}
