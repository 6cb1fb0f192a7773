//! Incremental page loader.
//!
//! Infinite-scroll feeds load posts asynchronously as the viewport moves.
//! The loader scrolls one viewport at a time, waits for content to settle,
//! and stops as soon as the document height stops growing or the time
//! budget is spent, whichever comes first.
//!
//! Only raw scroll height is compared between cycles. A feed that unloads
//! old posts while loading new ones can oscillate without ever settling;
//! the budget is what bounds that case.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::delay::delay_for;
use crate::browser::BrowserSession;
use crate::types::ScrapeError;

/// Default total time spent scrolling one page.
pub const DEFAULT_SCROLL_BUDGET: Duration = Duration::from_secs(60);

/// Default pause after each scroll for new posts to arrive.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy)]
pub struct LoaderSettings {
    pub budget: Duration,
    pub settle: Duration,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_SCROLL_BUDGET,
            settle: DEFAULT_SETTLE,
        }
    }
}

/// Why the scroll loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Height did not change after a scroll.
    ContentStable,
    /// Budget elapsed while the page was still growing.
    BudgetExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub cycles: u32,
    pub initial_height: u64,
    pub final_height: u64,
    pub termination: Termination,
}

/// Scroll `session` until its content stops growing or `settings.budget`
/// elapses. Errors from the session propagate; there is no retry.
pub async fn load_fully(
    session: &mut dyn BrowserSession,
    settings: LoaderSettings,
) -> Result<LoadStats, ScrapeError> {
    let initial_height = session.scroll_height().await?;
    let mut past_height = initial_height;
    let mut cycles = 0u32;
    let start = Instant::now();

    while start.elapsed() < settings.budget {
        session.scroll_viewport().await?;
        delay_for(settings.settle).await;
        cycles += 1;

        let new_height = session.scroll_height().await?;
        debug!(cycle = cycles, past_height, new_height, "Scrolled");

        if new_height == past_height {
            return Ok(LoadStats {
                cycles,
                initial_height,
                final_height: new_height,
                termination: Termination::ContentStable,
            });
        }
        past_height = new_height;
    }

    Ok(LoadStats {
        cycles,
        initial_height,
        final_height: past_height,
        termination: Termination::BudgetExhausted,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
