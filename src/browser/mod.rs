//! Browser rendering sessions.
//!
//! Defines the `SessionProvider` and `BrowserSession` traits the engine
//! drives, and a WebDriver-backed implementation in `webdriver`.

pub mod webdriver;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::types::ScrapeError;

/// Reads the scrollable extent of the document.
pub const SCROLL_HEIGHT_JS: &str = "return document.body.scrollHeight;";

/// Scrolls forward by one viewport height.
pub const SCROLL_VIEWPORT_JS: &str = "window.scrollBy(0, window.innerHeight);";

/// Launches fresh rendering sessions. One session per account fetch.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScrapeError>;
}

/// A single rendered page, owned exclusively by one fetch.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url`, failing if it does not finish within `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Run a script in the page and return its JSON result.
    async fn evaluate(&mut self, script: &str) -> Result<Value, ScrapeError>;

    /// Current serialized DOM.
    async fn content(&mut self) -> Result<String, ScrapeError>;

    /// Release the session. Called exactly once per launched session.
    async fn close(&mut self) -> Result<(), ScrapeError>;

    async fn scroll_height(&mut self) -> Result<u64, ScrapeError> {
        let value = self.evaluate(SCROLL_HEIGHT_JS).await?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
            .ok_or_else(|| ScrapeError::Rendering(format!("unexpected scroll height: {value}")))
    }

    async fn scroll_viewport(&mut self) -> Result<(), ScrapeError> {
        self.evaluate(SCROLL_VIEWPORT_JS).await?;
        Ok(())
    }
}
