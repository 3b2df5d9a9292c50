//! Progress reporting towards the embedding shell.
//!
//! Category-level status transitions are the externally observable error
//! signal; everything finer-grained goes through `tracing`.

use serde::{Deserialize, Serialize};

/// Lifecycle status of one worklist category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    /// Crawl in progress
    Extracting,
    /// Crawl or download batch finished for the category
    Completed,
    /// Category-level failure; processing continued with the next category
    Error,
}

impl std::fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CategoryStatus::Extracting => "extracting",
            CategoryStatus::Completed => "completed",
            CategoryStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// One progress update, as observers receive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Display name of the category the update pertains to
    pub category: String,

    /// New status
    pub status: CategoryStatus,

    /// Free-form detail; download batches report `"<done>/<total>"` and a
    /// final plain count
    pub detail: String,
}

/// Observer for category-level progress updates.
pub trait ProgressSink: Send + Sync {
    /// Report a status transition for a category.
    fn progress(&self, category: &str, status: CategoryStatus, detail: &str);
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&self, _category: &str, _status: CategoryStatus, _detail: &str) {}
}

/// Sink that forwards updates to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn progress(&self, category: &str, status: CategoryStatus, detail: &str) {
        tracing::info!(category = %category, status = %status, detail = %detail, "progress");
    }
}
