//! Capability traits the pipeline is driven through.
//!
//! The pipeline never owns a browser or an HTTP client directly: a ready
//! driver, a fetcher and a progress sink are injected, so tests (and
//! multiple concurrent sessions) can use independent fakes.

pub mod driver;
pub mod fetcher;
pub mod progress;

pub use driver::{DialogEvent, WebDriver};
pub use fetcher::Fetcher;
pub use progress::{CategoryStatus, NullSink, ProgressEvent, ProgressSink, TracingSink};
