//! Structural markers used to locate content in GitHub pages.
//!
//! Markers are CSS selectors keyed by result kind and concern. They are plain
//! configuration data: when GitHub changes its markup, the table is updated
//! (or overridden from the input file) and the extraction logic stays as is.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::{CrawlerError, Result, ResultKind};

/// What a marker is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
    /// Link elements of the individual results.
    PrimaryResult,
    /// Element shown when the search legitimately returned nothing.
    EmptyResult,
    /// List items of the language statistics widget on a repository page.
    Stats,
    /// Inline parts of a single statistics item (language name, percentage).
    StatsPart,
}

/// Markers for one result kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSelectors {
    /// Selector matching the result links.
    pub primary: String,
    /// Selector matching the "no results" notice.
    pub empty: String,
}

impl KindSelectors {
    pub fn new(primary: impl Into<String>, empty: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            empty: empty.into(),
        }
    }
}

/// Mapping from (kind, concern) to a CSS selector.
///
/// Every field has a default, so the input file only needs to name the
/// markers it wants to replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTable {
    pub repositories: KindSelectors,
    pub issues: KindSelectors,
    pub wikis: KindSelectors,
    pub stats: String,
    pub stats_part: String,
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self {
            repositories: KindSelectors::new("a.v-align-middle", "div.blankslate"),
            issues: KindSelectors::new(r#"a[class="Link--muted text-bold"]"#, "div.blankslate"),
            wikis: KindSelectors::new(
                r#"a[class="Link--muted text-small text-bold"]"#,
                "div.blankslate",
            ),
            stats: "li.d-inline".to_string(),
            stats_part: "span".to_string(),
        }
    }
}

impl SelectorTable {
    fn for_kind(&self, kind: ResultKind) -> &KindSelectors {
        match kind {
            ResultKind::Repositories => &self.repositories,
            ResultKind::Issues => &self.issues,
            ResultKind::Wikis => &self.wikis,
        }
    }

    /// Returns the raw selector for a kind and concern.
    pub fn get(&self, kind: ResultKind, concern: Concern) -> &str {
        match concern {
            Concern::PrimaryResult => &self.for_kind(kind).primary,
            Concern::EmptyResult => &self.for_kind(kind).empty,
            Concern::Stats => &self.stats,
            Concern::StatsPart => &self.stats_part,
        }
    }

    /// Parses the selector for a kind and concern.
    pub fn compile(&self, kind: ResultKind, concern: Concern) -> Result<Selector> {
        let css = self.get(kind, concern);
        Selector::parse(css).map_err(|e| {
            CrawlerError::InvalidConfig(format!("Failed to parse selector '{}': {:?}", css, e))
        })
    }

    /// Checks that every selector in the table parses.
    pub fn validate(&self) -> Result<()> {
        for kind in ResultKind::ALL {
            for concern in [
                Concern::PrimaryResult,
                Concern::EmptyResult,
                Concern::Stats,
                Concern::StatsPart,
            ] {
                self.compile(kind, concern)?;
            }
        }
        Ok(())
    }
}
