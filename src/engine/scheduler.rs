//! Periodic sweep scheduler.
//!
//! Runs a sweep over every target in configured order, prints the
//! cumulative report, waits the full interval, and repeats until shutdown.
//! The wait starts only after a sweep completes, so sweeps never overlap no
//! matter how long one takes.

use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::aggregator::{merge_result, render_report, SweepReport};
use super::fetcher::AccountFetcher;
use crate::browser::SessionProvider;
use crate::types::{AggregateState, Target};

/// Default pause between the end of one sweep and the start of the next.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

pub struct Scheduler<P> {
    fetcher: AccountFetcher<P>,
    targets: Vec<Target>,
    interval: Duration,
    state: AggregateState,
}

impl<P: SessionProvider> Scheduler<P> {
    /// Create a scheduler. The aggregate start time is captured here.
    pub fn new(fetcher: AccountFetcher<P>, targets: Vec<Target>, interval: Duration) -> Self {
        Self {
            fetcher,
            targets,
            interval,
            state: AggregateState::new(),
        }
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    /// Run one complete sweep and return its report.
    pub async fn run_sweep(&mut self) -> SweepReport {
        let failed_targets = self.scan(None).await.unwrap_or_default();
        self.finish_sweep(failed_targets)
    }

    /// Sweep immediately, then every `interval` after the previous sweep
    /// finishes, until `shutdown` becomes `true`.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            targets = self.targets.len(),
            interval_secs = self.interval.as_secs(),
            "Scheduler started"
        );

        loop {
            let Some(failed_targets) = self.scan(Some(&shutdown)).await else {
                break;
            };
            self.finish_sweep(failed_targets);

            info!(
                minutes = self.interval.as_secs() / 60,
                "Next sweep will begin in {} minutes",
                self.interval.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }

        info!(
            sweeps = self.state.sweeps_completed,
            symbols = self.state.totals.len(),
            "Scheduler stopped"
        );
    }

    /// Fetch and merge every target in order, returning the ones that
    /// failed. Returns `None` if `stop` was raised before the pass
    /// finished; totals merged so far are kept.
    async fn scan(&mut self, stop: Option<&watch::Receiver<bool>>) -> Option<Vec<String>> {
        let sweep_number = self.state.sweeps_completed + 1;
        info!(sweep = sweep_number, targets = self.targets.len(), "Starting sweep");

        let mut failed_targets = Vec::new();

        for target in &self.targets {
            if stop.is_some_and(|rx| *rx.borrow()) {
                warn!(sweep = sweep_number, "Shutdown requested mid-sweep, stopping");
                return None;
            }

            info!(account = %target, "Scraping account");
            let result = self.fetcher.fetch(target).await;
            if !result.is_success() {
                failed_targets.push(target.as_str().to_string());
            }
            merge_result(&mut self.state, &result);
        }

        Some(failed_targets)
    }

    /// Close out a completed pass: bump the sweep count, print the report.
    fn finish_sweep(&mut self, failed_targets: Vec<String>) -> SweepReport {
        self.state.sweeps_completed += 1;

        let mut report = render_report(&self.state, Utc::now());
        report.targets_scanned = self.targets.len();
        report.failed_targets = failed_targets;

        println!("\n{report}");
        info!(
            sweep = report.sweep_number,
            elapsed_minutes = report.elapsed_minutes,
            symbols = report.totals.len(),
            mentions = report.totals.total_mentions(),
            failed = report.failed_targets.len(),
            "Sweep complete"
        );

        report
    }
}

/// Resolves once the flag is raised. Never resolves if the sender is gone.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
