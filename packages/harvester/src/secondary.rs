//! Secondary document source: the automotive industry standards listing.
//!
//! Structurally a small sibling of the main pipeline: scrape a table of
//! entries behind a checkbox-driven filter, persist an identifier-to-URL
//! mapping, then download idempotently, sharing the cancellation,
//! progress-reporting and failure-containment contracts.

use regex::Regex;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::crawler::parse;
use crate::error::{CrawlError, DriverError, HarvestError};
use crate::session::SessionState;
use crate::store::RecordStore;
use crate::traits::{CategoryStatus, Fetcher, ProgressSink, WebDriver};
use crate::types::StandardsEdition;

/// Listing page for both standards editions.
pub const DOWNLOADS_URL: &str = "https://www.araiindia.com/downloads";

const NAVIGATE_TIMEOUT: Duration = Duration::from_secs(30);
const TABLE_TIMEOUT: Duration = Duration::from_secs(15);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(15);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Selectors for the standards listing page.
pub mod selectors {
    /// Checkbox that switches the table to draft standards.
    pub const DRAFT_FILTER: &str = "input#draftAIS";

    /// The Angular-rendered standards table.
    pub const STANDARDS_TABLE: &str = "table[_ngcontent-arai-c19]";
}

/// Replace characters that cannot appear in a filename (the codes carry
/// slashes, colons and whitespace) with underscores.
fn sanitize_code(code: &str) -> String {
    let forbidden = Regex::new(r#"[<>:"/\\|?*\s]"#).unwrap();
    forbidden.replace_all(code, "_").to_string()
}

/// File extension for a document URL; defaults to `pdf` when the path has
/// no usable suffix.
fn extension_of(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    match path.rsplit_once('.') {
        Some((_, ext))
            if !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => "pdf".to_string(),
    }
}

/// Scrape one edition's listing into its `code url` artifact.
///
/// Returns the number of entries written. The artifact is rewritten
/// wholesale, like the gazette record lists.
pub async fn list_standards<D, P>(
    driver: &D,
    edition: StandardsEdition,
    store: &RecordStore,
    session: &SessionState,
    sink: &P,
) -> Result<usize, HarvestError>
where
    D: WebDriver,
    P: ProgressSink,
{
    let name = edition.name();
    info!(edition = %name, "listing standards");

    driver
        .navigate(DOWNLOADS_URL, NAVIGATE_TIMEOUT)
        .await
        .map_err(CrawlError::Driver)?;
    if edition == StandardsEdition::Draft {
        driver
            .click(selectors::DRAFT_FILTER, CONTROL_TIMEOUT)
            .await
            .map_err(CrawlError::Driver)?;
    }
    if let Err(err) = driver
        .wait_for_selector(selectors::STANDARDS_TABLE, TABLE_TIMEOUT)
        .await
    {
        return Err(match err {
            DriverError::WaitTimeout { .. } => CrawlError::TableTimeout.into(),
            other => CrawlError::Driver(other).into(),
        });
    }

    let html = driver.content().await.map_err(CrawlError::Driver)?;
    let rows = parse::standards_rows(&html);
    let base = Url::parse(DOWNLOADS_URL).ok();

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        if session.is_cancelled() {
            break;
        }
        let resolved = match Url::parse(&row.href) {
            Ok(url) => url,
            Err(_) => match base.as_ref().and_then(|b| b.join(&row.href).ok()) {
                Some(url) => url,
                None => {
                    warn!(code = %row.code, href = %row.href, "unresolvable document link, skipping");
                    continue;
                }
            },
        };
        entries.push((sanitize_code(&row.code), resolved.to_string()));
    }

    store.save_standards_list(name, &entries).await?;
    info!(edition = %name, entries = entries.len(), "standards listing written");
    sink.progress(
        name,
        CategoryStatus::Completed,
        &format!("0/{}", entries.len()),
    );
    Ok(entries.len())
}

/// Download every listed standard for an edition, skipping targets that
/// already exist. Returns the number of files fetched this run; an absent
/// listing skips the edition.
pub async fn download_standards<F, P>(
    fetcher: &F,
    store: &RecordStore,
    edition: StandardsEdition,
    session: &SessionState,
    sink: &P,
) -> Result<usize, HarvestError>
where
    F: Fetcher,
    P: ProgressSink,
{
    let name = edition.name();
    let Some(entries) = store.load_standards_list(name).await? else {
        info!(edition = %name, "no standards listing, skipping");
        return Ok(0);
    };

    let total = entries.len();
    let mut downloaded = 0;

    for (code, url) in entries {
        if session.is_cancelled() {
            break;
        }
        let target = store.standards_document_path(name, &code, &extension_of(&url));
        match tokio::fs::try_exists(&target).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(err) => {
                warn!(path = %target.display(), error = %err, "existence probe failed");
                continue;
            }
        }

        let body = match fetcher.get(&url, DOWNLOAD_TIMEOUT).await {
            Ok(body) => body,
            Err(err) => {
                warn!(code = %code, url = %url, error = %err, "standard download failed");
                session.flag_timeout();
                continue;
            }
        };
        if let Err(err) = store.write_document(&target, &body).await {
            warn!(path = %target.display(), error = %err, "write failed");
            session.flag_timeout();
            continue;
        }

        downloaded += 1;
        session.note_downloads(1);
        sink.progress(
            name,
            CategoryStatus::Completed,
            &format!("{downloaded}/{total}"),
        );
    }

    sink.progress(name, CategoryStatus::Completed, &downloaded.to_string());
    info!(edition = %name, downloaded, "standards download batch finished");
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{standards_page, CollectingSink, MockDriver, MockDriverCall, MockFetcher};

    #[test]
    fn test_sanitize_code() {
        assert_eq!(sanitize_code("AIS-038 (Rev 2)"), "AIS-038_(Rev_2)");
        assert_eq!(sanitize_code("AIS/052:V1"), "AIS_052_V1");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("https://x.test/a/AIS-038.PDF"), "pdf");
        assert_eq!(extension_of("https://x.test/a/AIS-038.docx"), "docx");
        assert_eq!(extension_of("https://x.test/a/AIS-038"), "pdf");
        assert_eq!(extension_of("https://x.test/a.b/AIS-038.pdf?v=1"), "pdf");
    }

    #[tokio::test]
    async fn test_list_standards_writes_sanitized_resolved_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let driver = MockDriver::new().with_documents([standards_page(&[
            ("AIS-038 Rev 2", "https://hmr.araiindia.com/Control/AIS/AIS 038.pdf"),
            ("AIS-052", "/Control/AIS/AIS-052.pdf"),
        ])]);
        let sink = CollectingSink::new();
        let session = SessionState::new();
        session.begin_run();

        let count = list_standards(&driver, StandardsEdition::Draft, &store, &session, &sink)
            .await
            .unwrap();
        assert_eq!(count, 2);

        // Draft edition toggles the checkbox filter.
        assert!(driver.calls().iter().any(|call| matches!(
            call,
            MockDriverCall::Click { selector } if selector == selectors::DRAFT_FILTER
        )));

        let entries = store
            .load_standards_list("ARAI - AIS - draft")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entries[0].0, "AIS-038_Rev_2");
        // Spaces percent-encoded, relative link resolved against the page.
        assert_eq!(
            entries[0].1,
            "https://hmr.araiindia.com/Control/AIS/AIS%20038.pdf"
        );
        assert_eq!(
            entries[1].1,
            "https://www.araiindia.com/Control/AIS/AIS-052.pdf"
        );

        assert_eq!(sink.events().last().unwrap().detail, "0/2");
    }

    #[tokio::test]
    async fn test_published_edition_skips_the_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let driver = MockDriver::new().with_documents([standards_page(&[(
            "AIS-038",
            "https://hmr.araiindia.com/AIS-038.pdf",
        )])]);
        let sink = CollectingSink::new();
        let session = SessionState::new();
        session.begin_run();

        list_standards(&driver, StandardsEdition::Published, &store, &session, &sink)
            .await
            .unwrap();
        assert!(!driver
            .calls()
            .iter()
            .any(|call| matches!(call, MockDriverCall::Click { .. })));
    }

    #[tokio::test]
    async fn test_listing_timeout_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let driver = MockDriver::new().fail_wait(selectors::STANDARDS_TABLE);
        let sink = CollectingSink::new();
        let session = SessionState::new();
        session.begin_run();

        let result =
            list_standards(&driver, StandardsEdition::Draft, &store, &session, &sink).await;
        assert!(matches!(
            result,
            Err(HarvestError::Crawl(CrawlError::TableTimeout))
        ));
    }

    #[tokio::test]
    async fn test_download_standards_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        store
            .save_standards_list(
                "ARAI - AIS - draft",
                &[(
                    "AIS-038".to_string(),
                    "https://hmr.araiindia.com/AIS-038.pdf".to_string(),
                )],
            )
            .await
            .unwrap();

        let fetcher = MockFetcher::new()
            .with_document("https://hmr.araiindia.com/AIS-038.pdf", b"%PDF".to_vec());
        let sink = CollectingSink::new();
        let session = SessionState::new();
        session.begin_run();

        let first =
            download_standards(&fetcher, &store, StandardsEdition::Draft, &session, &sink)
                .await
                .unwrap();
        assert_eq!(first, 1);

        let second =
            download_standards(&fetcher, &store, StandardsEdition::Draft, &session, &sink)
                .await
                .unwrap();
        assert_eq!(second, 0);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_listing_skips_edition() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let fetcher = MockFetcher::new();
        let sink = CollectingSink::new();
        let session = SessionState::new();
        session.begin_run();

        let count =
            download_standards(&fetcher, &store, StandardsEdition::Draft, &session, &sink)
                .await
                .unwrap();
        assert_eq!(count, 0);
        assert!(fetcher.calls().is_empty());
    }
}
