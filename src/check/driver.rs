//! The browser automation seam
//!
//! The pipeline drives pages exclusively through this trait; hosts plug in a
//! concrete WebDriver-backed implementation. Failures are opaque strings:
//! the pipeline classifies them by which operation failed, not by inspecting
//! the message.

#[cfg(test)]
use mockall::automock;

use std::time::Duration;

use thiserror::Error;

use crate::catalog::record::LocatingInstruction;
use crate::task::CancelToken;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("driver operation failed: {0}")]
pub struct DriverError(pub String);

/// One browser session, opened once per update-check run and closed on every
/// exit path.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Opens the session. `user_agent` overrides the browser default when
    /// set; `page_load_timeout` bounds every subsequent navigation.
    async fn open<'a>(
        &self,
        user_agent: Option<&'a str>,
        page_load_timeout: Duration,
    ) -> Result<(), DriverError>;

    async fn navigate_to(&self, url: &str) -> Result<(), DriverError>;

    /// Visible text of the element with the given id.
    async fn text_in_element_by_id(&self, id: &str) -> Result<String, DriverError>;

    /// Visible text of every element matching the path expression, in
    /// document order.
    async fn texts_in_elements_matching(&self, path: &str) -> Result<Vec<String>, DriverError>;

    /// Visible text of the whole page.
    async fn page_text(&self) -> Result<String, DriverError>;

    /// Locates and clicks one element, retrying until the instruction's
    /// interval elapses or cancellation is requested.
    async fn click_element(
        &self,
        instruction: &LocatingInstruction,
        cancel: &CancelToken,
    ) -> Result<(), DriverError>;

    /// Closes the session. Infallible by contract; implementations log and
    /// swallow their own teardown failures.
    async fn quit(&self);
}
