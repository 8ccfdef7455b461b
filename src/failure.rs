//! Failure classification and per-run failure collection.
//!
//! Individual books failing must never abort a pass, so fetch and unpack
//! record their failures here and the command reports them once the pass
//! has finished.

use std::collections::BTreeMap;

/// Coarse failure categories for the end-of-run breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureCategory {
    /// The mirror has no copy of the archive under any candidate URL.
    NotFound,
    /// Connectivity, DNS or timeout problems.
    Network,
    /// Local filesystem errors.
    Disk,
    /// The downloaded archive could not be read.
    CorruptArchive,
    /// Anything that did not match a known category.
    Other,
}

impl FailureCategory {
    /// Short label used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::Network => "Network",
            Self::Disk => "Disk",
            Self::CorruptArchive => "Corrupt archive",
            Self::Other => "Other",
        }
    }
}

/// Classifies an error message string into a category.
#[must_use]
pub fn classify_failure(message: &str) -> FailureCategory {
    if message.contains("HTTP 404") {
        FailureCategory::NotFound
    } else if message.contains("timeout") || message.contains("network error") {
        FailureCategory::Network
    } else if message.contains("corrupt archive") {
        FailureCategory::CorruptArchive
    } else if message.contains("IO error") {
        FailureCategory::Disk
    } else {
        FailureCategory::Other
    }
}

/// One failed book.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    /// Ebook number the failure belongs to.
    pub id: u32,
    /// Catalog title, for readable reports.
    pub title: String,
    /// Classified category.
    pub category: FailureCategory,
    /// Full error message.
    pub message: String,
}

/// Collected failures for one pass.
#[derive(Debug, Default)]
pub struct FailureLog {
    records: Vec<FailureRecord>,
}

impl FailureLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failed book, classifying it from the message.
    pub fn record(&mut self, id: u32, title: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let category = classify_failure(&message);
        self.records.push(FailureRecord {
            id,
            title: title.into(),
            category,
            message,
        });
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All recorded failures, in occurrence order.
    #[must_use]
    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    /// Failure counts grouped by category.
    #[must_use]
    pub fn counts_by_category(&self) -> BTreeMap<FailureCategory, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        counts
    }
}
