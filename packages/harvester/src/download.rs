//! Idempotent batch downloader for persisted record lists.
//!
//! Each listed entry id resolves to a deterministic document URL; a target
//! file that already exists is a no-op success, which is what makes re-runs
//! and resumption after partial failures safe. A single failed download
//! never aborts the batch.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{HarvestError, StoreResult};
use crate::secondary;
use crate::session::SessionState;
use crate::store::RecordStore;
use crate::traits::{CategoryStatus, Fetcher, ProgressSink};
use crate::types::{CategoryCode, CategoryMap, Period};

/// Bound for a single document fetch.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Base of the portal's document archive.
const DOCUMENT_BASE_URL: &str = "https://egazette.gov.in/WriteReadData";

/// Canonical document identifier for an entry id: the segment after the
/// final `-`. Entry ids without a separator are their own identifier.
pub fn document_id(entry_id: &str) -> Option<String> {
    let id = entry_id.rsplit('-').next()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Deterministic archive URL for a document identifier within a year.
pub fn document_url(year: i32, document_id: &str) -> String {
    format!("{DOCUMENT_BASE_URL}/{year}/{document_id}.pdf")
}

/// Result of one category's download batch.
#[derive(Debug, Clone, Default)]
pub struct CategoryDownload {
    /// Files fetched and written this run
    pub downloaded: usize,

    /// Targets that already existed (no network call)
    pub skipped: usize,

    /// Document identifiers that failed to fetch or write
    pub failed: Vec<String>,
}

impl CategoryDownload {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Download every document listed for one category and period.
///
/// Returns `None` when the category has no persisted list: it was not
/// crawled, or had no relevant records; the caller skips it.
pub async fn download_category<F, P>(
    fetcher: &F,
    sink: &P,
    store: &RecordStore,
    category_name: &str,
    period: Period,
    session: &SessionState,
) -> StoreResult<Option<CategoryDownload>>
where
    F: Fetcher,
    P: ProgressSink,
{
    let Some(entry_ids) = store.load(category_name, period).await? else {
        info!(category = %category_name, "no persisted list, skipping category");
        return Ok(None);
    };

    let total = entry_ids.len();
    let mut batch = CategoryDownload::default();

    for entry_id in entry_ids {
        if session.is_cancelled() {
            break;
        }
        let Some(doc_id) = document_id(&entry_id) else {
            warn!(entry_id = %entry_id, "entry id yields no document identifier, skipping");
            continue;
        };

        let target = store.document_path(category_name, period, &doc_id);
        match tokio::fs::try_exists(&target).await {
            Ok(true) => {
                debug!(path = %target.display(), "file already exists, skipping download");
                batch.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(path = %target.display(), error = %err, "existence probe failed");
                batch.failed.push(doc_id);
                continue;
            }
        }

        let url = document_url(period.year, &doc_id);
        debug!(url = %url, "downloading document");
        let body = match fetcher.get(&url, DOWNLOAD_TIMEOUT).await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %url, error = %err, "download failed");
                session.flag_timeout();
                batch.failed.push(doc_id);
                continue;
            }
        };

        if let Err(err) = store.write_document(&target, &body).await {
            warn!(path = %target.display(), error = %err, "write failed");
            session.flag_timeout();
            batch.failed.push(doc_id);
            continue;
        }

        batch.downloaded += 1;
        session.note_downloads(1);
        sink.progress(
            category_name,
            CategoryStatus::Completed,
            &format!("{}/{}", batch.downloaded, total),
        );
    }

    // Final count for the category, even when nothing was fetched.
    sink.progress(
        category_name,
        CategoryStatus::Completed,
        &batch.downloaded.to_string(),
    );
    info!(
        category = %category_name,
        downloaded = batch.downloaded,
        skipped = batch.skipped,
        failed = batch.failed.len(),
        "category download batch finished"
    );
    Ok(Some(batch))
}

/// Download documents for every category in worklist order, routing the
/// sentinel codes to the secondary source's downloader.
///
/// Returns the number of files fetched this run. Category-level failures
/// are contained: the category is marked `error` and processing continues.
pub async fn download_all<F, P>(
    fetcher: &F,
    sink: &P,
    store: &RecordStore,
    categories: &CategoryMap,
    worklist: &[CategoryCode],
    period: Period,
    session: &SessionState,
) -> Result<usize, HarvestError>
where
    F: Fetcher,
    P: ProgressSink,
{
    let mut total = 0;

    for &code in worklist {
        if session.is_cancelled() {
            info!("cancellation requested, stopping downloads");
            break;
        }

        let name = categories.name_of(code);

        if let Some(edition) = code.standards_edition() {
            match secondary::download_standards(fetcher, store, edition, session, sink).await {
                Ok(count) => total += count,
                Err(err) => {
                    warn!(category = %name, error = %err, "secondary download batch failed");
                    sink.progress(&name, CategoryStatus::Error, "-");
                }
            }
            continue;
        }

        debug!(category = %name, code = %code, "downloading category");
        match download_category(fetcher, sink, store, &name, period, session).await {
            Ok(Some(batch)) => total += batch.downloaded,
            Ok(None) => {}
            Err(err) => {
                warn!(category = %name, error = %err, "download batch failed");
                sink.progress(&name, CategoryStatus::Error, "-");
            }
        }
    }

    info!(total, "download phase finished");
    Ok(total)
}
