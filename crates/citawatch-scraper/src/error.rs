use thiserror::Error;

/// Errors from the browser-driven portal pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Chrome DevTools Protocol failure (navigation, evaluation, transport).
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// The browser process could not be launched or configured.
    #[error("browser session error: {0}")]
    Session(String),

    /// A bounded wait for a DOM element elapsed. In the doctor-extraction
    /// step this is the one error that triggers the fallback strategy;
    /// everywhere else it fails the job.
    #[error("timed out waiting for {what}")]
    Timeout { what: String },

    /// The page did not have the DOM shape the form contract promises.
    #[error("unexpected page shape: {what}")]
    Protocol { what: String },

    /// A whole scrape job exceeded its deadline.
    #[error("scrape job timed out after {secs}s")]
    JobTimeout { secs: u64 },
}
