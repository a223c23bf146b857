//! Search results page extraction.

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::selectors::Concern;
use crate::{CrawlerError, Result, ResultKind, SelectorTable};

/// What a search results page contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Link targets of the results, in page order. Never empty.
    Links(Vec<String>),
    /// The page states that the search has no results.
    Empty,
}

/// Locates result links in a search results page.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    selectors: SelectorTable,
}

impl Extractor {
    pub fn new(selectors: SelectorTable) -> Self {
        Self { selectors }
    }

    /// Extracts the result links of the given kind.
    ///
    /// Three outcomes are told apart:
    ///
    /// - result links are present: their `href` values, in page order;
    /// - no result links but the "no results" notice is present: `Empty`;
    /// - neither, or a result link without `href`: `DataNotFound`, meaning
    ///   the page layout is no longer the one the selectors describe.
    pub fn extract(&self, html: &str, kind: ResultKind) -> Result<Extraction> {
        let document = Html::parse_document(html);
        let primary = self.selectors.compile(kind, Concern::PrimaryResult)?;

        let links = document
            .select(&primary)
            .map(|element| {
                element
                    .value()
                    .attr("href")
                    .map(str::to_string)
                    .ok_or(CrawlerError::DataNotFound)
            })
            .collect::<Result<Vec<_>>>()?;

        if !links.is_empty() {
            debug!("Found {} {} links", links.len(), kind);
            return Ok(Extraction::Links(links));
        }

        let empty = self.selectors.compile(kind, Concern::EmptyResult)?;
        if document.select(&empty).next().is_some() {
            debug!("Search page reports no {}", kind);
            Ok(Extraction::Empty)
        } else {
            Err(CrawlerError::DataNotFound)
        }
    }
}

/// Resolves a result `href` against the site base URL.
///
/// Resolution follows URL reference rules, so site-relative, protocol-relative
/// and dot-segment links all land where a browser would take them. An
/// unparseable base is a configuration error; an unresolvable `href` means
/// the page no longer holds the links the selectors expect.
pub fn absolute_url(base_url: &str, href: &str) -> Result<String> {
    let base = Url::parse(base_url)
        .map_err(|e| CrawlerError::InvalidConfig(format!("Invalid base URL '{}': {}", base_url, e)))?;
    let url = base.join(href).map_err(|e| {
        debug!("Cannot resolve link '{}': {}", href, e);
        CrawlerError::DataNotFound
    })?;
    Ok(url.to_string())
}
