//! Injected browser-automation capability.
//!
//! The crawler drives a live search session through this trait. Browser
//! lifecycle (launch, context, teardown) stays with the embedding
//! application; the pipeline is handed a driver that is already on a page.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::DriverResult;

/// A dialog the page raised asynchronously (server-side validation
/// messages, mostly "no records found").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogEvent {
    /// The dialog's message text, already dismissed by the driver
    pub message: String,
}

impl DialogEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Low-level DOM capability the crawler is injected with.
///
/// Implementations are expected to dismiss dialogs as they appear and
/// buffer the most recent one for [`WebDriver::take_dialog`]. All waiting
/// operations are bounded; a wait that elapses returns
/// [`DriverError::WaitTimeout`](crate::error::DriverError::WaitTimeout).
#[async_trait]
pub trait WebDriver: Send + Sync {
    /// Navigate the session to a URL.
    async fn navigate(&self, url: &str, timeout: Duration) -> DriverResult<()>;

    /// Click the element a selector resolves to.
    async fn click(&self, selector: &str, timeout: Duration) -> DriverResult<()>;

    /// Choose an option (by value) in a `<select>` control.
    async fn select_option(&self, selector: &str, value: &str, timeout: Duration)
        -> DriverResult<()>;

    /// Wait for a selector to attach.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> DriverResult<()>;

    /// Whether a selector currently resolves to at least one element.
    async fn query(&self, selector: &str) -> DriverResult<bool>;

    /// The current page's HTML.
    async fn content(&self) -> DriverResult<String>;

    /// Consume the dialog observed since the last call, if any.
    ///
    /// Consumption is one-shot: a second call (or a second timed-out wait)
    /// finds nothing unless a new dialog appeared in between. Callers that
    /// use the buffered dialog to explain a wait failure should drain the
    /// buffer right before issuing the wait, so the event they consume is
    /// scoped to that wait alone.
    fn take_dialog(&self) -> Option<DialogEvent>;
}
