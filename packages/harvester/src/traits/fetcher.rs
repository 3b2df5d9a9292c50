//! Injected HTTP fetch capability for document downloads.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::FetchResult;

/// Byte-oriented HTTP GET with a per-call bound.
///
/// Implementations raise on non-success status; the downloader treats any
/// error as a per-document failure and moves on.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL's body within the given bound.
    async fn get(&self, url: &str, timeout: Duration) -> FetchResult<Vec<u8>>;
}
