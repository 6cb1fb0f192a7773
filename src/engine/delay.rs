//! Cooperative pause used to pace scroll cycles.

use std::time::Duration;

/// Suspend the current task for at least `ms` milliseconds.
pub async fn delay(ms: u64) {
    delay_for(Duration::from_millis(ms)).await;
}

/// Suspend the current task for at least `duration`.
pub async fn delay_for(duration: Duration) {
    tokio::time::sleep(duration).await;
}
