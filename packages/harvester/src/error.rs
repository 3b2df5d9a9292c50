//! Typed errors for the harvesting pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors surfaced by the session controller.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The caller supplied an empty worklist.
    #[error("no categories selected")]
    NoCategoriesSelected,

    /// Crawl operation failed
    #[error("crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    /// Persistence operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Document fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors that can occur while crawling a category's result set.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Underlying driver operation failed
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Result table never attached and no dialog explained the wait failure
    #[error("timed out waiting for the result table")]
    TableTimeout,

    /// Result-count label did not end in a number
    #[error("unreadable result count label: {label:?}")]
    BadResultCount { label: String },

    /// A pager link was present but the next result page never loaded
    #[error("timed out loading result page {page}")]
    PageTimeout { page: u32 },

    /// The category dropdown yielded no usable options
    #[error("no categories found on the search page")]
    NoCategoryOptions,

    /// Cooperative cancellation was requested
    #[error("crawl cancelled")]
    Cancelled,
}

impl CrawlError {
    /// Whether this failure should raise the session-wide timeout flag.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            CrawlError::TableTimeout
                | CrawlError::PageTimeout { .. }
                | CrawlError::Driver(DriverError::WaitTimeout { .. })
        )
    }
}

/// Errors raised by the injected web-driver capability.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A bounded wait elapsed before the selector attached
    #[error("timed out waiting for {selector}")]
    WaitTimeout { selector: String },

    /// Navigation failed or was refused
    #[error("navigation failed: {url}")]
    Navigation { url: String },

    /// Any other driver-side failure
    #[error("driver protocol error: {0}")]
    Protocol(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by the HTTP fetch capability.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within its bound
    #[error("request timed out: {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading a relevance rule file.
#[derive(Debug, Error)]
pub enum RuleLoadError {
    /// Rule file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rule file was not a valid JSON rule list
    #[error("malformed rule file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for driver operations.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
