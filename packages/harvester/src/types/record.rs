//! Extracted result-table rows and per-category crawl output.

use serde::{Deserialize, Serialize};

/// One extracted result-table row. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteRecord {
    /// 1-based ordinal position within the category's result set
    pub index: usize,

    /// Site-assigned unique identifier for the entry
    pub entry_id: String,

    /// Subject text the relevance rules are scored against
    pub subject: String,
}

impl GazetteRecord {
    /// Create a record at the given ordinal.
    pub fn new(index: usize, entry_id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            index,
            entry_id: entry_id.into(),
            subject: subject.into(),
        }
    }
}

/// Output of one category crawl: the extracted records plus the
/// result-count label's authoritative total.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Records in encounter order
    pub records: Vec<GazetteRecord>,

    /// Total the result-count label promised
    pub expected: usize,
}

impl CrawlOutcome {
    /// Outcome for a category with no results (including dialog-downgraded
    /// timeouts).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the site delivered every record the count label promised.
    /// Short result sets are tolerated by the crawler, so callers use this
    /// only as a consistency check.
    pub fn is_consistent(&self) -> bool {
        self.records.len() == self.expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_outcome_is_consistent() {
        let outcome = CrawlOutcome::empty();
        assert!(outcome.is_consistent());
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_short_outcome_is_flagged() {
        let outcome = CrawlOutcome {
            records: vec![GazetteRecord::new(1, "CG-DL-E-1", "Subject")],
            expected: 2,
        };
        assert!(!outcome.is_consistent());
    }
}
