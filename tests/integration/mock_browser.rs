//! Mock browser for integration testing.
//!
//! Provides a deterministic `SessionProvider` whose pages are keyed by
//! account name. Records navigation order and per-account close counts;
//! individual accounts can be made to fail at navigation or scroll time.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use tickerwatch::browser::{BrowserSession, SessionProvider};
use tickerwatch::types::ScrapeError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Failure {
    Navigate,
    Scroll,
}

#[derive(Default)]
pub struct Log {
    /// Account names in navigation order, with the virtual time of each.
    pub navigations: Vec<(String, Instant)>,
    pub launches: u32,
    pub closes: HashMap<String, u32>,
}

impl Log {
    pub fn order(&self) -> Vec<String> {
        self.navigations.iter().map(|(a, _)| a.clone()).collect()
    }
}

/// All state is in-memory and shared with the test through `log`.
#[derive(Clone, Default)]
pub struct MockProvider {
    pages: Arc<HashMap<String, String>>,
    failures: Arc<HashMap<String, Failure>>,
    pub log: Arc<Mutex<Log>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `posts` as `<article>` elements on `account`'s profile.
    pub fn with_page(mut self, account: &str, posts: &[&str]) -> Self {
        let body: String = posts
            .iter()
            .map(|p| format!("<article><div>{p}</div></article>"))
            .collect();
        Arc::make_mut(&mut self.pages).insert(
            account.to_string(),
            format!("<html><body><nav>$MENU</nav>{body}</body></html>"),
        );
        self
    }

    pub fn failing(mut self, account: &str, failure: Failure) -> Self {
        Arc::make_mut(&mut self.failures).insert(account.to_string(), failure);
        self
    }

    pub fn closes(&self, account: &str) -> u32 {
        self.log.lock().unwrap().closes.get(account).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SessionProvider for MockProvider {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        self.log.lock().unwrap().launches += 1;
        Ok(Box::new(MockSession {
            provider: self.clone(),
            account: None,
            height: 1000,
            scrolls: 0,
        }))
    }
}

pub struct MockSession {
    provider: MockProvider,
    account: Option<String>,
    height: u64,
    scrolls: u32,
}

impl MockSession {
    fn failure(&self) -> Option<Failure> {
        self.account
            .as_ref()
            .and_then(|a| self.provider.failures.get(a).copied())
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        let account = url.rsplit('/').next().unwrap_or_default().to_string();
        self.provider
            .log
            .lock()
            .unwrap()
            .navigations
            .push((account.clone(), Instant::now()));
        self.account = Some(account);

        if self.failure() == Some(Failure::Navigate) {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: "timed out after 60s".into(),
            });
        }
        Ok(())
    }

    async fn evaluate(&mut self, _script: &str) -> Result<Value, ScrapeError> {
        Ok(Value::Null)
    }

    async fn content(&mut self) -> Result<String, ScrapeError> {
        let page = self
            .account
            .as_ref()
            .and_then(|a| self.provider.pages.get(a).cloned())
            .unwrap_or_default();
        Ok(page)
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        let key = self.account.clone().unwrap_or_default();
        *self
            .provider
            .log
            .lock()
            .unwrap()
            .closes
            .entry(key)
            .or_insert(0) += 1;
        Ok(())
    }

    /// Feed grows for two scrolls, then stops.
    async fn scroll_height(&mut self) -> Result<u64, ScrapeError> {
        if self.scrolls > 0 && self.scrolls <= 2 {
            self.height = 1000 + 1000 * u64::from(self.scrolls);
        }
        Ok(self.height)
    }

    async fn scroll_viewport(&mut self) -> Result<(), ScrapeError> {
        self.scrolls += 1;
        if self.failure() == Some(Failure::Scroll) {
            return Err(ScrapeError::Rendering("execution context was destroyed".into()));
        }
        Ok(())
    }
}
