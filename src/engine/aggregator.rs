//! Aggregator. Folds per-account counts into the running totals and
//! renders the per-sweep report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::types::{AggregateState, FetchOutcome, SessionResult, TickerCount};

/// Add every count in `counts` into the cumulative totals.
pub fn merge_into(state: &mut AggregateState, counts: &TickerCount) {
    for (symbol, count) in counts {
        state.totals.add(symbol, *count);
    }
}

/// Merge one fetch result, recording a failure if it had one.
pub fn merge_result(state: &mut AggregateState, result: &SessionResult) {
    match &result.outcome {
        FetchOutcome::Success(counts) => merge_into(state, counts),
        FetchOutcome::Failed(_) => state.targets_failed_total += 1,
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Snapshot of the cumulative totals after a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub sweep_number: u64,
    pub generated_at: DateTime<Utc>,
    pub elapsed_minutes: i64,
    pub totals: TickerCount,
    pub targets_scanned: usize,
    pub failed_targets: Vec<String>,
}

/// Build the report for `state` as of `now`.
pub fn render_report(state: &AggregateState, now: DateTime<Utc>) -> SweepReport {
    SweepReport {
        sweep_number: state.sweeps_completed,
        generated_at: now,
        elapsed_minutes: state.elapsed_minutes(now),
        totals: state.totals.clone(),
        targets_scanned: 0,
        failed_targets: Vec::new(),
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data collected after {} minutes:", self.elapsed_minutes)?;
        writeln!(f)?;
        for (symbol, count) in &self.totals {
            writeln!(f, "'{symbol}' mentioned '{count}' times")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
