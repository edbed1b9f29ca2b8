use async_trait::async_trait;

use crate::Notifier;

/// Notifier that writes messages to the log. Used when no delivery channel
/// is configured, so a sweep still produces visible output.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        tracing::info!(message = %text, "notification");
    }
}
