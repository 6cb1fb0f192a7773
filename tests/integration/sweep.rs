//! End-to-end sweeps through the fetcher, aggregator and scheduler.

use std::time::Duration;
use tokio::sync::watch;

use tickerwatch::engine::fetcher::{AccountFetcher, FetcherSettings};
use tickerwatch::engine::scheduler::{Scheduler, DEFAULT_SWEEP_INTERVAL};
use tickerwatch::types::{ScrapeError, Target};

use crate::mock_browser::{Failure, MockProvider};

fn targets(names: &[&str]) -> Vec<Target> {
    names.iter().map(|n| Target::new(*n)).collect()
}

fn scheduler(provider: MockProvider, names: &[&str]) -> Scheduler<MockProvider> {
    let fetcher = AccountFetcher::new(provider, FetcherSettings::default());
    Scheduler::new(fetcher, targets(names), DEFAULT_SWEEP_INTERVAL)
}

fn three_accounts() -> MockProvider {
    MockProvider::new()
        .with_page("A", &["I like $AAPL and $AAPL", "$TSLA up"])
        .with_page("B", &["$TSLA to the moon", "nothing here"])
        .with_page("C", &["$NVDA $AAPL", "$ABCDE and $AB"])
}

#[tokio::test(start_paused = true)]
async fn test_sweep_aggregates_all_targets() {
    let mut s = scheduler(three_accounts(), &["A", "B", "C"]);
    let report = s.run_sweep().await;

    assert_eq!(report.totals.get("$AAPL"), 3);
    assert_eq!(report.totals.get("$TSLA"), 2);
    assert_eq!(report.totals.get("$NVDA"), 1);
    assert_eq!(report.totals.get("$ABCD"), 1);
    assert_eq!(report.totals.get("$AB"), 0);
    // Outside any <article>
    assert_eq!(report.totals.get("$MENU"), 0);
    assert!(report.failed_targets.is_empty());

    let text = report.to_string();
    assert!(text.starts_with("Data collected after 0 minutes:"));
    assert!(text.contains("'$AAPL' mentioned '3' times"));
    assert!(text.contains("'$TSLA' mentioned '2' times"));
}

#[tokio::test(start_paused = true)]
async fn test_sweep_visits_targets_in_configured_order() {
    let provider = three_accounts();
    let log = provider.log.clone();
    let mut s = scheduler(provider, &["C", "A", "B"]);
    s.run_sweep().await;

    assert_eq!(log.lock().unwrap().order(), vec!["C", "A", "B"]);
}

#[tokio::test(start_paused = true)]
async fn test_one_session_at_a_time() {
    let provider = three_accounts();
    let log = provider.log.clone();
    let mut s = scheduler(provider, &["A", "B", "C"]);
    s.run_sweep().await;

    // Each fetch scrolls for three settle periods before the next starts
    let log = log.lock().unwrap();
    for pair in log.navigations.windows(2) {
        let gap = pair[1].1 - pair[0].1;
        assert!(gap >= Duration::from_secs(6), "fetches overlapped: {gap:?}");
    }
    assert_eq!(log.launches, 3);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_is_isolated() {
    let provider = three_accounts().failing("B", Failure::Navigate);
    let mut s = scheduler(provider.clone(), &["A", "B", "C"]);
    let report = s.run_sweep().await;

    // Counts from A and C only
    assert_eq!(report.totals.get("$AAPL"), 3);
    assert_eq!(report.totals.get("$TSLA"), 1);
    assert_eq!(report.totals.get("$NVDA"), 1);
    assert_eq!(report.failed_targets, vec!["B".to_string()]);

    assert_eq!(provider.closes("A"), 1);
    assert_eq!(provider.closes("B"), 1);
    assert_eq!(provider.closes("C"), 1);
    assert_eq!(s.state().targets_failed_total, 1);
}

#[tokio::test(start_paused = true)]
async fn test_rendering_failure_is_isolated() {
    let provider = three_accounts().failing("A", Failure::Scroll);
    let mut s = scheduler(provider.clone(), &["A", "B", "C"]);
    let report = s.run_sweep().await;

    assert_eq!(report.totals.get("$AAPL"), 1);
    assert_eq!(report.totals.get("$TSLA"), 1);
    assert_eq!(report.failed_targets, vec!["A".to_string()]);
    assert_eq!(provider.closes("A"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_reports_tagged_failure() {
    let provider = MockProvider::new().failing("X", Failure::Navigate);
    let fetcher = AccountFetcher::new(provider.clone(), FetcherSettings::default());
    let result = fetcher.fetch(&Target::new("X")).await;

    match result.error() {
        Some(ScrapeError::Navigation { url, .. }) => assert_eq!(url, "https://twitter.com/X"),
        other => panic!("expected navigation error, got {other:?}"),
    }
    assert!(result.counts().is_empty());
    assert_eq!(provider.closes("X"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_target_failing_still_reports() {
    let provider = MockProvider::new()
        .failing("A", Failure::Navigate)
        .failing("B", Failure::Scroll);
    let mut s = scheduler(provider, &["A", "B"]);
    let report = s.run_sweep().await;

    assert!(report.totals.is_empty());
    assert_eq!(report.failed_targets.len(), 2);
    assert_eq!(report.to_string(), "Data collected after 0 minutes:\n\n");
}

#[tokio::test(start_paused = true)]
async fn test_periodic_run_waits_full_interval_between_sweeps() {
    let provider = three_accounts();
    let log = provider.log.clone();
    let s = scheduler(provider, &["A", "B", "C"]);
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut s = s;
        s.run(rx).await;
        s
    });

    // Two sweeps plus part of the second wait
    tokio::time::sleep(Duration::from_secs(20 * 60)).await;
    tx.send(true).unwrap();
    let s = handle.await.unwrap();

    assert_eq!(s.state().sweeps_completed, 2);
    assert_eq!(s.state().totals.get("$AAPL"), 6);
    assert_eq!(s.state().totals.get("$TSLA"), 4);

    let log = log.lock().unwrap();
    assert_eq!(log.order(), vec!["A", "B", "C", "A", "B", "C"]);

    // Second sweep begins one full interval after the first one ended
    let first_sweep_end = log.navigations[2].1 + Duration::from_secs(6);
    let second_sweep_start = log.navigations[3].1;
    assert!(second_sweep_start - first_sweep_end >= DEFAULT_SWEEP_INTERVAL);
}
