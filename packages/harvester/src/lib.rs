//! Gazette Harvesting Pipeline
//!
//! Extracts structured records from a paginated, session-based gazette
//! search portal, filters them against a keyword rule set, and downloads
//! the matching documents, resuming safely across runs.
//!
//! # Design Philosophy
//!
//! - Capabilities in, behavior out: the browser session, the HTTP client
//!   and the progress observer are injected traits, never globals, so
//!   multiple sessions (and tests) use independent fakes.
//! - Failures stay small: everything is contained at the smallest enclosing
//!   loop (per row, per category, per document); only cancellation stops a
//!   run.
//! - Re-runs are free: a download whose target file exists is a no-op, so
//!   interrupted batches resume by simply running again.
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::{Controller, HttpFetcher, Period, RecordStore, RuleSet, TracingSink};
//!
//! let categories = harvester::crawler::load_category_map(&driver).await?;
//! let (worklist, _unknown) = categories.codes_for(["Ministry of Road Transport"]);
//!
//! let controller = Controller::new(
//!     driver,
//!     HttpFetcher::new(),
//!     TracingSink,
//!     RecordStore::new("files"),
//!     categories,
//!     RuleSet::builtin(),
//! );
//! let report = controller.run(&worklist, Period::current()).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability abstractions (WebDriver, Fetcher, ProgressSink)
//! - [`types`] - Categories, periods and extracted records
//! - [`relevance`] - Keyword rule set and classifier
//! - [`crawler`] - Pagination crawler over the search grid
//! - [`store`] - Persisted record lists and document placement
//! - [`download`] - Idempotent batch downloader
//! - [`secondary`] - Secondary standards source sub-pipeline
//! - [`controller`] - Session controller sequencing the phases
//! - [`session`] - Shared cancellation/flag state
//! - [`testing`] - Mock implementations for testing

pub mod controller;
pub mod crawler;
pub mod download;
pub mod error;
pub mod fetchers;
pub mod relevance;
pub mod secondary;
pub mod session;
pub mod store;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    CrawlError, DriverError, FetchError, HarvestError, RuleLoadError, StoreError,
};
pub use traits::{
    driver::{DialogEvent, WebDriver},
    fetcher::Fetcher,
    progress::{CategoryStatus, NullSink, ProgressEvent, ProgressSink, TracingSink},
};
pub use types::{
    category::{CategoryCode, CategoryMap, StandardsEdition},
    period::Period,
    record::{CrawlOutcome, GazetteRecord},
};

// Re-export the pipeline surface
pub use controller::{Controller, ExtractionReport, RunReport};
pub use crawler::{crawl_category, load_category_map, PAGE_SIZE};
pub use download::{document_id, document_url, download_all, CategoryDownload};
pub use relevance::{FilterDecision, RelevanceRule, RuleSet};
pub use secondary::{download_standards, list_standards};
pub use session::{RunPhase, SessionState};
pub use store::RecordStore;

// Re-export fetchers
pub use fetchers::HttpFetcher;
