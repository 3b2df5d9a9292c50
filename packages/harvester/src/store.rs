//! Durable record lists and document placement.
//!
//! One text artifact per `(category, period)` holds the relevance-filtered
//! entry ids; it is regenerated wholesale on each crawl, never patched.
//! Documents land next to their category's list. The secondary source keeps
//! a flat `code url` listing per edition.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::StoreResult;
use crate::relevance::RuleSet;
use crate::types::{GazetteRecord, Period};

/// Filename of the per-category relevance list.
const GAZETTE_LIST_FILE: &str = "gids_list.txt";

/// Filename of the secondary source's `code url` listing.
const STANDARDS_LIST_FILE: &str = "aids_list.txt";

/// Marker prefix for relevant entries.
const RELEVANT_MARKER: &str = "1";

/// Filesystem-backed store for record lists and downloaded documents.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
    audit_markers: bool,
}

impl RecordStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            audit_markers: false,
        }
    }

    /// Also write `0#<entryId>` lines for rejected records, keeping an
    /// audit trail of what the filter dropped.
    pub fn with_audit_markers(mut self) -> Self {
        self.audit_markers = true;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a category's relevance list for a period.
    pub fn list_path(&self, category_name: &str, period: Period) -> PathBuf {
        self.period_dir(category_name, period).join(GAZETTE_LIST_FILE)
    }

    /// Path a downloaded gazette document lands at.
    pub fn document_path(&self, category_name: &str, period: Period, document_id: &str) -> PathBuf {
        self.period_dir(category_name, period)
            .join(format!("{document_id}.pdf"))
    }

    /// Path of a secondary edition's listing artifact.
    pub fn standards_list_path(&self, source_name: &str) -> PathBuf {
        self.root.join(source_name).join(STANDARDS_LIST_FILE)
    }

    /// Path a secondary document lands at.
    pub fn standards_document_path(&self, source_name: &str, code: &str, extension: &str) -> PathBuf {
        self.root
            .join(source_name)
            .join(format!("{code}.{extension}"))
    }

    fn period_dir(&self, category_name: &str, period: Period) -> PathBuf {
        self.root
            .join(category_name)
            .join(period.year.to_string())
            .join(period.month_number().to_string())
    }

    /// Apply the rule set to each record's subject and rewrite the
    /// category's list with the relevant entries in encounter order.
    ///
    /// Returns the relevant count; zero is a valid, non-error outcome (an
    /// empty list file is still written, replacing any earlier run's).
    pub async fn save(
        &self,
        category_name: &str,
        period: Period,
        records: &[GazetteRecord],
        rules: &RuleSet,
    ) -> StoreResult<usize> {
        let mut lines = String::new();
        let mut relevant = 0;
        for record in records {
            let decision = rules.decide(record);
            if decision.is_relevant {
                lines.push_str(RELEVANT_MARKER);
                lines.push('#');
                lines.push_str(&record.entry_id);
                lines.push('\n');
                relevant += 1;
            } else if self.audit_markers {
                lines.push_str("0#");
                lines.push_str(&record.entry_id);
                lines.push('\n');
            } else {
                debug!(
                    entry_id = %record.entry_id,
                    subject = %record.subject,
                    "keyword mismatch, dropped"
                );
            }
        }

        let path = self.list_path(category_name, period);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, lines).await?;
        debug!(path = %path.display(), relevant, total = records.len(), "record list written");
        Ok(relevant)
    }

    /// Load the relevant entry ids persisted for a category and period.
    ///
    /// `None` means the category was never crawled for the period (or had
    /// its artifact removed); callers skip it, it is not an error.
    pub async fn load(
        &self,
        category_name: &str,
        period: Period,
    ) -> StoreResult<Option<Vec<String>>> {
        let path = self.list_path(category_name, period);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let ids = raw
            .lines()
            .filter_map(|line| {
                let (marker, entry_id) = line.split_once('#')?;
                (marker == RELEVANT_MARKER && !entry_id.is_empty())
                    .then(|| entry_id.to_string())
            })
            .collect();
        Ok(Some(ids))
    }

    /// Rewrite a secondary edition's `code url` listing.
    pub async fn save_standards_list(
        &self,
        source_name: &str,
        entries: &[(String, String)],
    ) -> StoreResult<()> {
        let mut lines = String::new();
        for (code, url) in entries {
            lines.push_str(code);
            lines.push(' ');
            lines.push_str(url);
            lines.push('\n');
        }
        let path = self.standards_list_path(source_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, lines).await?;
        Ok(())
    }

    /// Load a secondary edition's `(code, url)` entries; `None` when the
    /// edition was never listed.
    pub async fn load_standards_list(
        &self,
        source_name: &str,
    ) -> StoreResult<Option<Vec<(String, String)>>> {
        let path = self.standards_list_path(source_name);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let entries = raw
            .lines()
            .filter_map(|line| {
                let (code, url) = line.split_once(' ')?;
                (!code.is_empty() && !url.is_empty())
                    .then(|| (code.to_string(), url.to_string()))
            })
            .collect();
        Ok(Some(entries))
    }

    /// Write a downloaded document atomically: the body goes to a `.part`
    /// sibling first and is renamed into place, so an interrupted run never
    /// leaves a half-written file that a later run would skip.
    pub async fn write_document(&self, path: &Path, body: &[u8]) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut partial: OsString = path.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);
        fs::write(&partial, body).await?;
        fs::rename(&partial, path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::RelevanceRule;
    use chrono::Month;

    fn period() -> Period {
        Period::new(2026, Month::June)
    }

    fn truck_rules() -> RuleSet {
        RuleSet::compile([RelevanceRule::new("Truck", false)])
    }

    #[tokio::test]
    async fn test_save_writes_relevant_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let records = vec![
            GazetteRecord::new(1, "CG-DL-E-240626-000001", "New truck safety norms"),
            GazetteRecord::new(2, "CG-DL-E-240626-000002", "Postal tariff update"),
            GazetteRecord::new(3, "CG-DL-E-240626-000003", "Truck axle load limits"),
        ];

        let relevant = store
            .save("Ministry of Road Transport", period(), &records, &truck_rules())
            .await
            .unwrap();
        assert_eq!(relevant, 2);

        let raw = std::fs::read_to_string(
            store.list_path("Ministry of Road Transport", period()),
        )
        .unwrap();
        assert_eq!(
            raw,
            "1#CG-DL-E-240626-000001\n1#CG-DL-E-240626-000003\n"
        );
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let rules = truck_rules();

        let first = vec![GazetteRecord::new(1, "CG-DL-E-1", "Truck one")];
        store.save("Roads", period(), &first, &rules).await.unwrap();

        let second = vec![GazetteRecord::new(1, "CG-DL-E-2", "Truck two")];
        store.save("Roads", period(), &second, &rules).await.unwrap();

        let ids = store.load("Roads", period()).await.unwrap().unwrap();
        assert_eq!(ids, vec!["CG-DL-E-2".to_string()]);
    }

    #[tokio::test]
    async fn test_zero_relevant_is_a_valid_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let records = vec![GazetteRecord::new(1, "CG-DL-E-1", "Postal tariff update")];
        let relevant = store
            .save("Roads", period(), &records, &truck_rules())
            .await
            .unwrap();
        assert_eq!(relevant, 0);

        let ids = store.load("Roads", period()).await.unwrap().unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_audit_markers_keep_rejected_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path()).with_audit_markers();

        let records = vec![
            GazetteRecord::new(1, "CG-DL-E-1", "Truck rules"),
            GazetteRecord::new(2, "CG-DL-E-2", "Postal tariff update"),
        ];
        store.save("Roads", period(), &records, &truck_rules()).await.unwrap();

        let raw =
            std::fs::read_to_string(store.list_path("Roads", period())).unwrap();
        assert_eq!(raw, "1#CG-DL-E-1\n0#CG-DL-E-2\n");

        // Audit lines are not surfaced when loading for download.
        let ids = store.load("Roads", period()).await.unwrap().unwrap();
        assert_eq!(ids, vec!["CG-DL-E-1".to_string()]);
    }

    #[tokio::test]
    async fn test_load_missing_list_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        assert!(store.load("Never Crawled", period()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_standards_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let entries = vec![
            (
                "AIS-038_Rev_2".to_string(),
                "https://hmr.araiindia.com/Control/AIS/AIS-038.pdf".to_string(),
            ),
            (
                "AIS-052".to_string(),
                "https://hmr.araiindia.com/Control/AIS/AIS-052.pdf".to_string(),
            ),
        ];
        store
            .save_standards_list("ARAI - AIS - draft", &entries)
            .await
            .unwrap();

        let loaded = store
            .load_standards_list("ARAI - AIS - draft")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, entries);

        assert!(store
            .load_standards_list("ARAI - AIS - published")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_write_document_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let target = store.document_path("Roads", period(), "123456");

        store.write_document(&target, b"%PDF-1.4").await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.4");

        // No partial file left behind.
        let siblings: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(siblings, vec![std::ffi::OsString::from("123456.pdf")]);
    }
}
