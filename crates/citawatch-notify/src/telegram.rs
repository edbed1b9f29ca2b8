//! Telegram Bot API delivery channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use citawatch_core::TelegramConfig;

use crate::Notifier;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Sends messages to a single Telegram chat through the Bot API
/// `sendMessage` method.
///
/// Construction can fail (HTTP client build); delivery cannot. Failed sends
/// are logged at `warn` and dropped, per the notifier contract.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: i64,
}

impl TelegramNotifier {
    /// Creates a notifier pointed at the production Bot API.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest::Error` if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &TelegramConfig) -> Result<Self, reqwest::Error> {
        Self::with_api_base(config, DEFAULT_API_BASE)
    }

    /// Creates a notifier with a custom API base URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest::Error` if the HTTP client cannot be
    /// constructed.
    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(
                    status = response.status().as_u16(),
                    "Telegram rejected notification"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to deliver Telegram notification");
            }
        }
    }
}
