//! WebDriver-backed sessions via `fantoccini`.
//!
//! Each `launch()` opens a new WebDriver session against a running
//! chromedriver/geckodriver. Uses the `eager` page-load strategy so
//! navigation returns once the DOM is parsed, leaving script-rendered
//! content to the incremental loader.

use async_trait::async_trait;
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{BrowserSession, SessionProvider};
use crate::types::ScrapeError;

/// Upper bound on creating a WebDriver session.
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens WebDriver sessions against a fixed endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverProvider {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverProvider {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
        }
    }

    /// Session capabilities sent with every new-session request.
    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));
        if self.headless {
            caps.insert(
                "goog:chromeOptions".to_string(),
                json!({ "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] }),
            );
            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": ["-headless"] }),
            );
        }
        caps
    }
}

#[async_trait]
impl SessionProvider for WebDriverProvider {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());

        let client = tokio::time::timeout(LAUNCH_TIMEOUT, builder.connect(&self.webdriver_url))
            .await
            .map_err(|_| ScrapeError::Timeout {
                operation: "session launch".to_string(),
                secs: LAUNCH_TIMEOUT.as_secs(),
            })?
            .map_err(|e| ScrapeError::Launch(format!("{}: {e}", self.webdriver_url)))?;

        debug!(webdriver = %self.webdriver_url, headless = self.headless, "WebDriver session opened");
        Ok(Box::new(WebDriverSession { client: Some(client) }))
    }
}

/// One WebDriver session. `client` is taken on close.
pub struct WebDriverSession {
    client: Option<Client>,
}

impl WebDriverSession {
    fn client(&self) -> Result<&Client, ScrapeError> {
        self.client
            .as_ref()
            .ok_or_else(|| ScrapeError::Rendering("session already closed".to_string()))
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let client = self.client()?;

        // Page-load timeout on the driver side, hard deadline on ours
        client
            .update_timeouts(TimeoutConfiguration::new(None, Some(timeout), None))
            .await
            .map_err(|e| ScrapeError::Rendering(format!("set timeouts: {e}")))?;

        match tokio::time::timeout(timeout, client.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: format!("timed out after {}s", timeout.as_secs()),
            }),
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, ScrapeError> {
        self.client()?
            .execute(script, Vec::new())
            .await
            .map_err(|e| ScrapeError::Rendering(format!("script failed: {e}")))
    }

    async fn content(&mut self) -> Result<String, ScrapeError> {
        self.client()?
            .source()
            .await
            .map_err(|e| ScrapeError::Rendering(format!("page source: {e}")))
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        match self.client.take() {
            Some(client) => client
                .close()
                .await
                .map_err(|e| ScrapeError::Rendering(format!("close: {e}"))),
            None => Ok(()),
        }
    }
}
