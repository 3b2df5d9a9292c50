//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that embed the pipeline
//! without a real browser session or network access.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::crawler::selectors;
use crate::error::{DriverError, DriverResult, FetchError, FetchResult};
use crate::traits::{CategoryStatus, DialogEvent, Fetcher, ProgressEvent, ProgressSink, WebDriver};

/// Record of a call made to the mock driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockDriverCall {
    Navigate { url: String },
    Click { selector: String },
    SelectOption { selector: String, value: String },
    WaitForSelector { selector: String },
    Query { selector: String },
    Content,
}

#[derive(Default)]
struct DriverState {
    /// Result documents in pager order; `content()` serves the current one.
    documents: Vec<String>,
    cursor: usize,
    fail_always: HashSet<String>,
    fail_on: HashMap<String, HashSet<usize>>,
    wait_counts: HashMap<String, usize>,
    dialogs: VecDeque<String>,
    pending_dialog: Option<DialogEvent>,
    calls: Vec<MockDriverCall>,
}

/// A scripted web driver.
///
/// Serves a fixed sequence of documents; clicking a pager link labelled
/// `n` moves the cursor to document `n`, and `query` reports pager links
/// beyond the scripted documents as absent. Wait failures are scheduled
/// per selector, optionally paired with a queued dialog so timed-out waits
/// can emulate a blocking server dialog.
#[derive(Default)]
pub struct MockDriver {
    state: Arc<Mutex<DriverState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result documents, one per pager position.
    pub fn with_documents(self, documents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.state.lock().unwrap().documents = documents.into_iter().map(Into::into).collect();
        self
    }

    /// Every wait on `selector` times out.
    pub fn fail_wait(self, selector: impl Into<String>) -> Self {
        self.state.lock().unwrap().fail_always.insert(selector.into());
        self
    }

    /// The `occurrence`-th (1-based) wait on `selector` times out.
    pub fn fail_wait_on(self, selector: impl Into<String>, occurrence: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_on
            .entry(selector.into())
            .or_default()
            .insert(occurrence);
        self
    }

    /// Queue a dialog that becomes consumable after the next timed-out
    /// wait, as a dismissed server dialog would.
    pub fn dialog_on_timeout(self, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().dialogs.push_back(message.into());
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockDriverCall> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl WebDriver for MockDriver {
    async fn navigate(&self, url: &str, _timeout: Duration) -> DriverResult<()> {
        self.state.lock().unwrap().calls.push(MockDriverCall::Navigate {
            url: url.to_string(),
        });
        Ok(())
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockDriverCall::Click {
            selector: selector.to_string(),
        });
        if let Some(page) = selectors::pager_page(selector) {
            let position = page as usize;
            if position >= 1 && position <= state.documents.len() {
                state.cursor = position - 1;
            }
        }
        Ok(())
    }

    async fn select_option(
        &self,
        selector: &str,
        value: &str,
        _timeout: Duration,
    ) -> DriverResult<()> {
        self.state.lock().unwrap().calls.push(MockDriverCall::SelectOption {
            selector: selector.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockDriverCall::WaitForSelector {
            selector: selector.to_string(),
        });

        let occurrence = {
            let count = state.wait_counts.entry(selector.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        let fails = state.fail_always.contains(selector)
            || state
                .fail_on
                .get(selector)
                .is_some_and(|set| set.contains(&occurrence));
        if fails {
            if let Some(message) = state.dialogs.pop_front() {
                state.pending_dialog = Some(DialogEvent::new(message));
            }
            return Err(DriverError::WaitTimeout {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    async fn query(&self, selector: &str) -> DriverResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockDriverCall::Query {
            selector: selector.to_string(),
        });
        if let Some(page) = selectors::pager_page(selector) {
            return Ok(page as usize <= state.documents.len());
        }
        Ok(true)
    }

    async fn content(&self) -> DriverResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockDriverCall::Content);
        let cursor = state.cursor;
        Ok(state.documents.get(cursor).cloned().unwrap_or_default())
    }

    fn take_dialog(&self) -> Option<DialogEvent> {
        self.state.lock().unwrap().pending_dialog.take()
    }
}

#[derive(Default)]
struct FetcherState {
    documents: HashMap<String, Vec<u8>>,
    fail: HashSet<String>,
    calls: Vec<String>,
}

/// A mock fetcher serving predefined bodies without network access.
///
/// Unknown URLs answer 404; failing URLs time out.
#[derive(Default)]
pub struct MockFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_document(self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.state.lock().unwrap().documents.insert(url.into(), body);
        self
    }

    /// Mark a URL as timing out.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.state.lock().unwrap().fail.insert(url.into());
        self
    }

    /// URLs fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str, _timeout: Duration) -> FetchResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(url.to_string());

        if state.fail.contains(url) {
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }
        state
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// A sink that accumulates every progress event for assertions.
#[derive(Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events observed so far, in order.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectingSink {
    fn progress(&self, category: &str, status: CategoryStatus, detail: &str) {
        self.events.lock().unwrap().push(ProgressEvent {
            category: category.to_string(),
            status,
            detail: detail.to_string(),
        });
    }
}

/// Build one gazette result page: count label plus grid, header row first.
///
/// `first_row_index` seeds the span-id suffixes, which restart per page on
/// the real grid.
pub fn gazette_result_page(total: usize, first_row_index: usize, rows: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body>\n");
    html.push_str(&format!(
        "<span id=\"lbl_Result\">Total Gazettes Found : {total}</span>\n"
    ));
    html.push_str("<table id=\"gvGazetteList\">\n");
    html.push_str("<tr><th>Sr No</th><th>Gazette ID</th><th>Subject</th></tr>\n");
    for (offset, (entry_id, subject)) in rows.iter().enumerate() {
        let i = first_row_index + offset;
        html.push_str(&format!(
            "<tr><td>{sr}</td>\
             <td><span id=\"gvGazetteList_lbl_UGID_{i}\">{entry_id}</span></td>\
             <td><span id=\"gvGazetteList_lbl_Subject_{i}\">{subject}</span></td></tr>\n",
            sr = offset + 1,
        ));
    }
    html.push_str("</table>\n</body></html>");
    html
}

/// Build the search menu page with the ministry dropdown populated.
pub fn ministry_options_page(options: &[(u32, &str)]) -> String {
    let mut html = String::from(
        "<html><body><select name=\"ddlMinistry\">\n<option value=\"0\">Select Ministry</option>\n",
    );
    for (value, name) in options {
        html.push_str(&format!("<option value=\"{value}\">{name}</option>\n"));
    }
    html.push_str("</select></body></html>");
    html
}

/// Build the secondary standards listing page.
pub fn standards_page(rows: &[(&str, &str)]) -> String {
    let mut html = String::from(
        "<html><body><table _ngcontent-arai-c19>\n\
         <thead><tr><th>Sr No</th><th>AIS Code</th><th>Title</th><th>Download</th></tr></thead>\n\
         <tbody>\n",
    );
    for (i, (code, href)) in rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{sr}</td><td>{code}</td><td>Standard title</td>\
             <td><a href=\"{href}\">Download</a></td></tr>\n",
            sr = i + 1,
        ));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_driver_pager_navigation() {
        tokio_test::block_on(async {
            let driver = MockDriver::new().with_documents(["page one", "page two"]);

            assert_eq!(driver.content().await.unwrap(), "page one");
            assert!(driver.query(&selectors::pager_link(2)).await.unwrap());
            assert!(!driver.query(&selectors::pager_link(3)).await.unwrap());

            driver
                .click(&selectors::pager_link(2), Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(driver.content().await.unwrap(), "page two");
        });
    }

    #[tokio::test]
    async fn test_mock_driver_scheduled_wait_failures() {
        let driver = MockDriver::new().fail_wait_on("table#t", 2);

        assert!(driver
            .wait_for_selector("table#t", Duration::from_secs(1))
            .await
            .is_ok());
        assert!(matches!(
            driver
                .wait_for_selector("table#t", Duration::from_secs(1))
                .await,
            Err(DriverError::WaitTimeout { .. })
        ));
        assert!(driver
            .wait_for_selector("table#t", Duration::from_secs(1))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_mock_driver_dialog_is_one_shot() {
        let driver = MockDriver::new()
            .fail_wait("table#t")
            .dialog_on_timeout("No Record Found !");

        let _ = driver
            .wait_for_selector("table#t", Duration::from_secs(1))
            .await;
        assert_eq!(
            driver.take_dialog(),
            Some(DialogEvent::new("No Record Found !"))
        );
        assert_eq!(driver.take_dialog(), None);

        // Dialog queue is exhausted; the next timeout buffers nothing.
        let _ = driver
            .wait_for_selector("table#t", Duration::from_secs(1))
            .await;
        assert_eq!(driver.take_dialog(), None);
    }

    #[tokio::test]
    async fn test_mock_fetcher() {
        let fetcher = MockFetcher::new()
            .with_document("https://x.test/a.pdf", b"body".to_vec())
            .fail_url("https://x.test/slow.pdf");

        assert_eq!(
            fetcher
                .get("https://x.test/a.pdf", Duration::from_secs(1))
                .await
                .unwrap(),
            b"body".to_vec()
        );
        assert!(matches!(
            fetcher
                .get("https://x.test/slow.pdf", Duration::from_secs(1))
                .await,
            Err(FetchError::Timeout { .. })
        ));
        assert!(matches!(
            fetcher
                .get("https://x.test/missing.pdf", Duration::from_secs(1))
                .await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.calls().len(), 3);
    }
}
