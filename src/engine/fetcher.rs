//! Account fetcher: one target, one browser session.
//!
//! Launches a session, navigates to the account's profile, scrolls the feed
//! with the incremental loader, parses post text and counts cashtags. The
//! session is closed on every path once launched. Failures never propagate:
//! they come back as a tagged `SessionResult` so the sweep keeps going.

use scraper::Selector;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::extractor::extract_counts;
use super::loader::{load_fully, LoaderSettings};
use crate::browser::{BrowserSession, SessionProvider};
use crate::config::AppConfig;
use crate::parser::{parse_posts, post_selector, DEFAULT_POST_SELECTOR};
use crate::types::{ScrapeError, SessionResult, Target, TickerCount};

/// Default limit on initial page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub profile_base_url: String,
    pub navigation_timeout: Duration,
    pub loader: LoaderSettings,
    pub post_selector: String,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            profile_base_url: "https://twitter.com".to_string(),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            loader: LoaderSettings::default(),
            post_selector: DEFAULT_POST_SELECTOR.to_string(),
        }
    }
}

impl FetcherSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            profile_base_url: cfg.watcher.profile_base_url.clone(),
            navigation_timeout: Duration::from_secs(cfg.browser.navigation_timeout_secs),
            loader: LoaderSettings {
                budget: Duration::from_secs(cfg.browser.scroll_budget_secs),
                settle: Duration::from_millis(cfg.browser.settle_ms),
            },
            post_selector: cfg.browser.post_selector.clone(),
        }
    }
}

pub struct AccountFetcher<P> {
    provider: P,
    settings: FetcherSettings,
    selector: Selector,
}

impl<P: SessionProvider> AccountFetcher<P> {
    pub fn new(provider: P, settings: FetcherSettings) -> Self {
        let selector = post_selector(&settings.post_selector);
        Self {
            provider,
            settings,
            selector,
        }
    }

    /// Fetch cashtag counts for `target`. Never fails; errors are logged
    /// and returned inside the result with empty counts.
    pub async fn fetch(&self, target: &Target) -> SessionResult {
        let mut session = match self.provider.launch().await {
            Ok(s) => s,
            Err(e) => {
                warn!(account = %target, error = %e, "Could not start browser session");
                return SessionResult::failed(target.clone(), e);
            }
        };

        let result = self.scrape(session.as_mut(), target).await;

        if let Err(e) = session.close().await {
            warn!(account = %target, error = %e, "Failed to close browser session");
        }

        match result {
            Ok(counts) => {
                info!(
                    account = %target,
                    symbols = counts.len(),
                    mentions = counts.total_mentions(),
                    "Account scraped"
                );
                SessionResult::success(target.clone(), counts)
            }
            Err(e) => {
                warn!(account = %target, kind = e.kind(), error = %e, "Account scrape failed");
                SessionResult::failed(target.clone(), e)
            }
        }
    }

    async fn scrape(
        &self,
        session: &mut dyn BrowserSession,
        target: &Target,
    ) -> Result<TickerCount, ScrapeError> {
        let url = target.profile_url(&self.settings.profile_base_url);
        session.navigate(&url, self.settings.navigation_timeout).await?;
        info!(account = %target, url = %url, "Fetching posts");

        let stats = load_fully(session, self.settings.loader).await?;
        debug!(
            account = %target,
            cycles = stats.cycles,
            final_height = stats.final_height,
            termination = ?stats.termination,
            "Feed loaded"
        );

        let html = session.content().await?;
        let blocks = parse_posts(&html, &self.selector);
        debug!(account = %target, posts = blocks.len(), "Posts parsed");

        Ok(extract_counts(&blocks))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
