//! Result kinds supported by the GitHub search page.

use std::fmt;
use std::str::FromStr;

use crate::CrawlerError;

/// Names accepted for the `type` field of the input configuration.
pub const VALID_TYPES: [&str; 3] = ["Repositories", "Issues", "Wikis"];

/// Category of search being performed.
///
/// Decides which markers the extractor looks for and whether results are
/// enriched with data from their own pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Repositories,
    Issues,
    Wikis,
}

impl ResultKind {
    /// All kinds, in the order GitHub lists them.
    pub const ALL: [ResultKind; 3] = [
        ResultKind::Repositories,
        ResultKind::Issues,
        ResultKind::Wikis,
    ];

    /// Value used for the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Repositories => "Repositories",
            ResultKind::Issues => "Issues",
            ResultKind::Wikis => "Wikis",
        }
    }

    /// Whether results of this kind are enriched with owner and language data.
    pub fn needs_enrichment(&self) -> bool {
        matches!(self, ResultKind::Repositories)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKind {
    type Err = CrawlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(CrawlerError::InvalidType)
    }
}
