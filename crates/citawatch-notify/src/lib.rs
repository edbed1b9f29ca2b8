//! Notification sink for availability sweep results.
//!
//! [`Notifier`] is a single-method capability: callers hand over a finished
//! message and move on. Delivery failures are the notifier's problem; they
//! are logged here and never surfaced to the pipelines.

pub mod telegram;

mod log;
mod recording;

use async_trait::async_trait;

pub use log::LogNotifier;
pub use recording::RecordingNotifier;
pub use telegram::TelegramNotifier;

/// Best-effort message sink shared by both pipelines.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one human-readable message. Never fails from the caller's
    /// point of view; implementations log their own delivery errors.
    async fn notify(&self, text: &str);
}
