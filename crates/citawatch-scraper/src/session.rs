//! Browser session lifecycle over the Chrome DevTools Protocol.
//!
//! Each scrape job owns one isolated headless Chrome instance; sessions are
//! never shared or reused, since filling the form mutates page state
//! destructively.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use citawatch_core::PortalConfig;

use crate::driver::FormDriver;
use crate::error::ScrapeError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One live browser with a single page, plus the CDP handler task that pumps
/// protocol messages for it.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launches an isolated Chrome instance and opens a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Session`] if the launch options are invalid and
    /// [`ScrapeError::Browser`] if the process or page cannot be started.
    pub async fn launch(config: &PortalConfig) -> Result<Self, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(1280, 720);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(ScrapeError::Session)?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // Pump CDP websocket messages until the connection ends.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Shuts the browser down. Close errors are logged, not propagated; the
    /// session is gone either way.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "error closing browser session");
        }
        self.handler_task.abort();
    }

    /// Evaluates a JS expression and deserializes its result.
    async fn eval<T: DeserializeOwned>(&self, expression: String, what: &str) -> Result<T, ScrapeError> {
        let result = self.page.evaluate(expression).await?;
        result.into_value::<T>().map_err(|e| ScrapeError::Protocol {
            what: format!("{what}: {e}"),
        })
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Backstop for exit paths that bypass close(); the chromium child
        // itself is killed when the Browser handle drops.
        self.handler_task.abort();
    }
}

/// Quotes a string as a JS literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl FormDriver for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el !== null && el.offsetParent !== null; }})()",
            sel = js_string(selector)
        );

        let poll = async {
            loop {
                let visible: bool = self.eval(expression.clone(), selector).await?;
                if visible {
                    return Ok(());
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ScrapeError::Timeout {
                what: selector.to_string(),
            }),
        }
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<(), ScrapeError> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (el === null) {{ return false; }} \
             el.value = {val}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            sel = js_string(selector),
            val = js_string(value)
        );
        let found: bool = self.eval(expression, selector).await?;
        if found {
            Ok(())
        } else {
            Err(ScrapeError::Protocol {
                what: format!("{selector} disappeared before its value was set"),
            })
        }
    }

    async fn option_labels(&self, selector: &str) -> Result<Vec<String>, ScrapeError> {
        let expression = format!(
            "Array.from(document.querySelectorAll({sel})).map((option) => option.innerText)",
            sel = js_string(&format!("{selector} option"))
        );
        self.eval(expression, selector).await
    }

    async fn input_value(&self, selector: &str) -> Result<String, ScrapeError> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el === null ? null : el.value; }})()",
            sel = js_string(selector)
        );
        let value: Option<String> = self.eval(expression, selector).await?;
        value.ok_or_else(|| ScrapeError::Protocol {
            what: format!("{selector} is missing"),
        })
    }

    async fn is_read_only(&self, selector: &str) -> Result<bool, ScrapeError> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el === null ? null : el.readOnly; }})()",
            sel = js_string(selector)
        );
        let value: Option<bool> = self.eval(expression, selector).await?;
        value.ok_or_else(|| ScrapeError::Protocol {
            what: format!("{selector} is missing"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::js_string;

    #[test]
    fn js_string_quotes_plain_text() {
        assert_eq!(js_string("#centro"), "\"#centro\"");
    }

    #[test]
    fn js_string_escapes_quotes_and_backslashes() {
        assert_eq!(js_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }
}
