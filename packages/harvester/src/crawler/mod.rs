//! Pagination crawler for the gazette search grid.
//!
//! Drives an injected [`WebDriver`] through one category's search results:
//! submit the search, wait for the grid, read the authoritative result
//! count, then walk the pager until every promised record is extracted.
//! Unexpected server dialogs during the table wait downgrade the category
//! to an empty result instead of an error.

pub mod parse;

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CrawlError, CrawlResult, DriverError};
use crate::session::SessionState;
use crate::traits::WebDriver;
use crate::types::{CategoryCode, CategoryMap, CrawlOutcome, GazetteRecord, Period};

/// Gazette portal entry point.
pub const PORTAL_URL: &str = "https://egazette.gov.in/";

/// Search menu the category form lives on.
pub const SEARCH_MENU_URL: &str = "https://egazette.gov.in/SearchMenu.aspx";

/// Records per result page; every 15th extracted record advances the
/// expected pager label by one.
pub const PAGE_SIZE: usize = 15;

const PORTAL_TIMEOUT: Duration = Duration::from_secs(45);
const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(20);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(15);
const TABLE_TIMEOUT: Duration = Duration::from_secs(15);
const LABEL_TIMEOUT: Duration = Duration::from_secs(10);
const REPAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Selectors for the search form and result grid.
pub mod selectors {
    pub const MINISTRY_PANEL_BUTTON: &str = r#"input[name="btnMinistry"]"#;
    pub const MINISTRY_DROPDOWN: &str = r#"select[name="ddlMinistry"]"#;
    pub const MONTH_DROPDOWN: &str = r#"select[name="ddlmonth"]"#;
    pub const SUBMIT_BUTTON: &str = r#"input[name="ImgSubmitDetails"]"#;
    pub const RESULT_TABLE: &str = "table#gvGazetteList";
    pub const RESULT_COUNT_LABEL: &str = "span#lbl_Result";

    /// Pager anchors are labelled with the bare page number.
    pub fn pager_link(page: u32) -> String {
        format!(r#"a:has-text("{page}")"#)
    }

    /// Inverse of [`pager_link`], for fakes that emulate the pager.
    pub fn pager_page(selector: &str) -> Option<u32> {
        let pattern = regex::Regex::new(r#"^a:has-text\("(\d+)"\)$"#).unwrap();
        pattern
            .captures(selector)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }
}

/// Navigate to the search menu and parse the category dropdown into the
/// session's code/name map. Performed once per session; the map is
/// immutable afterwards.
pub async fn load_category_map<D: WebDriver>(driver: &D) -> CrawlResult<CategoryMap> {
    driver.navigate(PORTAL_URL, PORTAL_TIMEOUT).await?;
    driver.navigate(SEARCH_MENU_URL, PORTAL_TIMEOUT).await?;
    driver
        .click(selectors::MINISTRY_PANEL_BUTTON, CONTROL_TIMEOUT)
        .await?;
    driver
        .wait_for_selector(selectors::MINISTRY_DROPDOWN, BOOTSTRAP_TIMEOUT)
        .await?;

    let html = driver.content().await?;
    let options = parse::category_options(&html);
    if options.is_empty() {
        return Err(CrawlError::NoCategoryOptions);
    }
    info!(categories = options.len(), "category map loaded");
    Ok(CategoryMap::from_options(options))
}

/// Crawl one category's result set for the given period.
///
/// Returns the extracted records in encounter order together with the
/// result-count label's total. Short result sets (fewer pager links or
/// shorter pages than the count promised) finish the crawl normally;
/// callers can compare via [`CrawlOutcome::is_consistent`].
pub async fn crawl_category<D: WebDriver>(
    driver: &D,
    code: CategoryCode,
    period: Period,
    session: &SessionState,
) -> CrawlResult<CrawlOutcome> {
    driver
        .select_option(selectors::MINISTRY_DROPDOWN, &code.to_string(), CONTROL_TIMEOUT)
        .await?;
    driver
        .select_option(selectors::MONTH_DROPDOWN, period.month_name(), CONTROL_TIMEOUT)
        .await?;

    // Discard any dialog left over from an earlier wait, so a dialog
    // consumed below is known to belong to this search.
    driver.take_dialog();

    driver
        .click(selectors::SUBMIT_BUTTON, CONTROL_TIMEOUT)
        .await?;

    if let Err(err) = driver
        .wait_for_selector(selectors::RESULT_TABLE, TABLE_TIMEOUT)
        .await
    {
        return match err {
            DriverError::WaitTimeout { .. } => match driver.take_dialog() {
                Some(dialog) => {
                    info!(
                        category = %code,
                        message = %dialog.message,
                        "server dialog dismissed, treating category as empty"
                    );
                    Ok(CrawlOutcome::empty())
                }
                None => Err(CrawlError::TableTimeout),
            },
            other => Err(CrawlError::Driver(other)),
        };
    }

    if let Err(err) = driver
        .wait_for_selector(selectors::RESULT_COUNT_LABEL, LABEL_TIMEOUT)
        .await
    {
        return match err {
            DriverError::WaitTimeout { .. } => Err(CrawlError::TableTimeout),
            other => Err(CrawlError::Driver(other)),
        };
    }

    let mut html = driver.content().await?;
    let label = parse::result_count_label(&html).unwrap_or_default();
    let expected = parse::parse_result_count(&label)
        .ok_or(CrawlError::BadResultCount { label })?;
    info!(category = %code, expected, "result table found");

    let mut records: Vec<GazetteRecord> = Vec::new();
    let mut page_no: u32 = 1;
    'pages: loop {
        if session.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        let before = records.len();
        for (entry_id, subject) in parse::gazette_rows(&html) {
            if records.len() >= expected {
                break 'pages;
            }
            if session.is_cancelled() {
                return Err(CrawlError::Cancelled);
            }
            let index = records.len() + 1;
            debug!(index, entry_id = %entry_id, subject = %subject, "row extracted");
            records.push(GazetteRecord::new(index, entry_id, subject));
            if records.len() % PAGE_SIZE == 0 {
                page_no += 1;
            }
        }

        if records.len() >= expected {
            break;
        }
        if records.len() == before {
            // A page that contributes nothing means the pager reloaded the
            // same rows; stopping keeps the crawl from spinning.
            warn!(
                category = %code,
                extracted = records.len(),
                expected,
                "result page contributed no new records, stopping"
            );
            break;
        }

        let pager = selectors::pager_link(page_no);
        if !driver.query(&pager).await? {
            debug!(
                category = %code,
                page = page_no,
                extracted = records.len(),
                expected,
                "pager link absent, site has fewer pages than expected"
            );
            break;
        }

        debug!(category = %code, page = page_no, "advancing to next result page");
        driver.take_dialog();
        driver.click(&pager, CONTROL_TIMEOUT).await.map_err(|err| match err {
            DriverError::WaitTimeout { .. } => CrawlError::PageTimeout { page: page_no },
            other => CrawlError::Driver(other),
        })?;
        if let Err(err) = driver
            .wait_for_selector(selectors::RESULT_TABLE, REPAGE_TIMEOUT)
            .await
        {
            return match err {
                DriverError::WaitTimeout { .. } => Err(CrawlError::PageTimeout { page: page_no }),
                other => Err(CrawlError::Driver(other)),
            };
        }
        html = driver.content().await?;
    }

    Ok(CrawlOutcome { records, expected })
}
