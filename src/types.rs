//! Shared types for tickerwatch.
//!
//! The data model used by the loader, extractor, fetcher, aggregator and
//! scheduler. Kept free of browser and HTTP concerns so every engine module
//! can depend on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// An account identifier to scrape. Order of targets in the config is the
/// per-sweep scan order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Profile page URL for this account under `base_url`.
    pub fn profile_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.0)
        )
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// TextBlock
// ---------------------------------------------------------------------------

/// Plain text of a single post, as pulled out of the rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock(pub String);

impl TextBlock {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TextBlock {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TextBlock {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// TickerCount
// ---------------------------------------------------------------------------

/// Symbol → mention count. Iterates in lexical symbol order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerCount(BTreeMap<String, u64>);

impl TickerCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, symbol: &str) {
        self.add(symbol, 1);
    }

    pub fn add(&mut self, symbol: &str, count: u64) {
        match self.0.get_mut(symbol) {
            Some(existing) => *existing += count,
            None => {
                self.0.insert(symbol.to_string(), count);
            }
        }
    }

    /// Count for `symbol`, zero if never seen.
    pub fn get(&self, symbol: &str) -> u64 {
        self.0.get(symbol).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, u64> {
        self.0.iter()
    }

    /// Sum of all counts.
    pub fn total_mentions(&self) -> u64 {
        self.0.values().sum()
    }
}

impl<'a> IntoIterator for &'a TickerCount {
    type Item = (&'a String, &'a u64);
    type IntoIter = btree_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for TickerCount {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = TickerCount::new();
        for (symbol, count) in iter {
            counts.add(&symbol.into(), count);
        }
        counts
    }
}

// ---------------------------------------------------------------------------
// Fetch results
// ---------------------------------------------------------------------------

/// What one account fetch produced.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(TickerCount),
    Failed(ScrapeError),
}

/// Result of fetching one target during one sweep.
#[derive(Debug)]
pub struct SessionResult {
    pub target: Target,
    pub outcome: FetchOutcome,
}

impl SessionResult {
    pub fn success(target: Target, counts: TickerCount) -> Self {
        Self {
            target,
            outcome: FetchOutcome::Success(counts),
        }
    }

    pub fn failed(target: Target, error: ScrapeError) -> Self {
        Self {
            target,
            outcome: FetchOutcome::Failed(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&ScrapeError> {
        match &self.outcome {
            FetchOutcome::Failed(e) => Some(e),
            FetchOutcome::Success(_) => None,
        }
    }

    /// Counts found for this target; empty if the fetch failed.
    pub fn counts(&self) -> TickerCount {
        match &self.outcome {
            FetchOutcome::Success(c) => c.clone(),
            FetchOutcome::Failed(_) => TickerCount::new(),
        }
    }

    pub fn into_counts(self) -> TickerCount {
        match self.outcome {
            FetchOutcome::Success(c) => c,
            FetchOutcome::Failed(_) => TickerCount::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate state
// ---------------------------------------------------------------------------

/// Process-wide cumulative tallies.
///
/// Owned by the scheduler, which is the only writer. Sweeps run one after
/// another, so no locking is involved.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateState {
    pub totals: TickerCount,
    pub start_time: DateTime<Utc>,
    pub sweeps_completed: u64,
    pub targets_failed_total: u64,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            totals: TickerCount::new(),
            start_time,
            sweeps_completed: 0,
            targets_failed_total: 0,
        }
    }

    /// Whole minutes elapsed since start, rounded to nearest.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        let secs = (now - self.start_time).num_seconds().max(0);
        (secs as f64 / 60.0).round() as i64
    }
}

impl Default for AggregateState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Per-target scrape failures. Never escape the account fetcher.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Rendering error: {0}")]
    Rendering(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },
}

impl ScrapeError {
    /// Short label for logs and the status endpoint.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Launch(_) => "launch",
            ScrapeError::Navigation { .. } => "navigation",
            ScrapeError::Rendering(_) => "rendering",
            ScrapeError::Timeout { .. } => "timeout",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
