//! Session controller: sequences crawl-then-persist across the worklist,
//! then downloads, against one shared session state.
//!
//! All failures are contained at the smallest enclosing loop; nothing
//! aborts the whole session except cancellation. Only one run may be active
//! at a time; serializing runs is the caller's responsibility.

use std::sync::Arc;
use tracing::{info, warn};

use crate::crawler;
use crate::download;
use crate::error::{CrawlError, HarvestError, Result};
use crate::relevance::RuleSet;
use crate::secondary;
use crate::session::SessionState;
use crate::store::RecordStore;
use crate::traits::{CategoryStatus, Fetcher, ProgressSink, WebDriver};
use crate::types::{CategoryCode, CategoryMap, Period};

/// Result of one extraction phase.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Categories crawled and persisted without error
    pub categories_processed: usize,

    /// Total entries written across all persisted lists
    pub relevant_records: usize,

    /// Display names of categories that failed
    pub failed_categories: Vec<String>,
}

impl ExtractionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every category crawled cleanly.
    pub fn is_success(&self) -> bool {
        self.failed_categories.is_empty()
    }
}

/// Result of a combined extraction + download run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub extraction: ExtractionReport,

    /// Files fetched during the download phase
    pub downloaded: usize,
}

/// Coordinates the crawl/filter/download lifecycle over a worklist of
/// categories, against injected driver, fetcher and progress capabilities.
pub struct Controller<D, F, P> {
    driver: D,
    fetcher: F,
    sink: P,
    store: RecordStore,
    categories: CategoryMap,
    rules: RuleSet,
    session: Arc<SessionState>,
}

impl<D, F, P> Controller<D, F, P>
where
    D: WebDriver,
    F: Fetcher,
    P: ProgressSink,
{
    /// Create a controller with its own session state.
    ///
    /// The category map is built once per session (see
    /// [`crawler::load_category_map`]) and treated as immutable here.
    pub fn new(
        driver: D,
        fetcher: F,
        sink: P,
        store: RecordStore,
        categories: CategoryMap,
        rules: RuleSet,
    ) -> Self {
        Self {
            driver,
            fetcher,
            sink,
            store,
            categories,
            rules,
            session: Arc::new(SessionState::new()),
        }
    }

    /// Share an externally owned session state (so the shell can cancel and
    /// observe flags through its own handle).
    pub fn with_session(mut self, session: Arc<SessionState>) -> Self {
        self.session = session;
        self
    }

    /// Handle to the shared session state.
    pub fn session(&self) -> Arc<SessionState> {
        Arc::clone(&self.session)
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Crawl, filter and persist every category in worklist order.
    ///
    /// An empty worklist raises the session's empty-worklist flag and
    /// returns [`HarvestError::NoCategoriesSelected`] instead of silently
    /// doing nothing.
    pub async fn run_extraction(
        &self,
        worklist: &[CategoryCode],
        period: Period,
    ) -> Result<ExtractionReport> {
        self.check_worklist(worklist)?;
        self.session.begin_run();
        let report = self.extract_worklist(worklist, period).await;
        self.session.finish_run();
        Ok(report)
    }

    /// Download documents for every category in worklist order.
    pub async fn run_downloads(&self, worklist: &[CategoryCode], period: Period) -> Result<usize> {
        self.check_worklist(worklist)?;
        self.session.begin_run();
        let downloaded = self.download_worklist(worklist, period).await?;
        self.session.finish_run();
        Ok(downloaded)
    }

    /// Both phases under a single session lifecycle: the download counter
    /// and flags span the whole run.
    pub async fn run(&self, worklist: &[CategoryCode], period: Period) -> Result<RunReport> {
        self.check_worklist(worklist)?;
        self.session.begin_run();
        let extraction = self.extract_worklist(worklist, period).await;
        let downloaded = if self.session.is_cancelled() {
            0
        } else {
            self.download_worklist(worklist, period).await?
        };
        self.session.finish_run();
        Ok(RunReport {
            extraction,
            downloaded,
        })
    }

    fn check_worklist(&self, worklist: &[CategoryCode]) -> Result<()> {
        if worklist.is_empty() {
            warn!("run requested with no categories selected");
            self.session.flag_empty_worklist();
            return Err(HarvestError::NoCategoriesSelected);
        }
        Ok(())
    }

    async fn extract_worklist(
        &self,
        worklist: &[CategoryCode],
        period: Period,
    ) -> ExtractionReport {
        info!(categories = worklist.len(), period = %period, "extraction phase starting");
        let mut report = ExtractionReport::new();

        for &code in worklist {
            if self.session.is_cancelled() {
                info!("cancellation requested, stopping extraction");
                break;
            }

            let name = self.categories.name_of(code);
            self.sink.progress(&name, CategoryStatus::Extracting, "-");

            if let Some(edition) = code.standards_edition() {
                match secondary::list_standards(
                    &self.driver,
                    edition,
                    &self.store,
                    &self.session,
                    &self.sink,
                )
                .await
                {
                    Ok(listed) => {
                        report.categories_processed += 1;
                        report.relevant_records += listed;
                    }
                    Err(err) => {
                        warn!(category = %name, error = %err, "secondary listing failed");
                        if let HarvestError::Crawl(crawl) = &err {
                            if crawl.is_timeout() {
                                self.session.flag_timeout();
                            }
                        }
                        self.sink.progress(&name, CategoryStatus::Error, "-");
                        report.failed_categories.push(name);
                    }
                }
                continue;
            }

            match crawler::crawl_category(&self.driver, code, period, &self.session).await {
                Err(CrawlError::Cancelled) => break,
                Err(err) => {
                    warn!(category = %name, error = %err, "category crawl failed");
                    if err.is_timeout() {
                        self.session.flag_timeout();
                    }
                    self.sink.progress(&name, CategoryStatus::Error, "-");
                    report.failed_categories.push(name);
                }
                Ok(outcome) => {
                    if !outcome.is_consistent() {
                        warn!(
                            category = %name,
                            extracted = outcome.records.len(),
                            expected = outcome.expected,
                            "extracted record count differs from the result label"
                        );
                    }
                    match self
                        .store
                        .save(&name, period, &outcome.records, &self.rules)
                        .await
                    {
                        Ok(relevant) => {
                            report.categories_processed += 1;
                            report.relevant_records += relevant;
                            let detail = if relevant > 0 {
                                format!("0/{relevant}")
                            } else {
                                "0".to_string()
                            };
                            self.sink.progress(&name, CategoryStatus::Completed, &detail);
                            info!(category = %name, relevant, "category extraction finished");
                        }
                        Err(err) => {
                            warn!(category = %name, error = %err, "persisting record list failed");
                            self.sink.progress(&name, CategoryStatus::Error, "-");
                            report.failed_categories.push(name);
                        }
                    }
                }
            }
        }

        info!(
            processed = report.categories_processed,
            relevant = report.relevant_records,
            failed = report.failed_categories.len(),
            "extraction phase finished"
        );
        report
    }

    async fn download_worklist(
        &self,
        worklist: &[CategoryCode],
        period: Period,
    ) -> Result<usize> {
        download::download_all(
            &self.fetcher,
            &self.sink,
            &self.store,
            &self.categories,
            worklist,
            period,
            &self.session,
        )
        .await
    }
}
