//! DOM operations the form pipeline needs, as a capability trait.
//!
//! [`crate::session::BrowserSession`] implements this over a live Chrome
//! page; tests substitute a scripted fake so the state machine can be
//! exercised without a browser.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScrapeError;

#[async_trait]
pub trait FormDriver: Send + Sync {
    /// Load the target page and wait for the navigation to complete.
    async fn navigate(&self, url: &str) -> Result<(), ScrapeError>;

    /// Block until the element is present and visible, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Timeout`] when the bound elapses first.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Write a value into a form control and fire its change events.
    async fn set_value(&self, selector: &str, value: &str) -> Result<(), ScrapeError>;

    /// Labels of every `<option>` under the selected list control.
    async fn option_labels(&self, selector: &str) -> Result<Vec<String>, ScrapeError>;

    /// Current value of a text input. Missing element is a
    /// [`ScrapeError::Protocol`], not an empty value.
    async fn input_value(&self, selector: &str) -> Result<String, ScrapeError>;

    /// The element's `readOnly` DOM property. Missing element or property is
    /// a [`ScrapeError::Protocol`].
    async fn is_read_only(&self, selector: &str) -> Result<bool, ScrapeError>;
}
