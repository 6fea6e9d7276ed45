//! Periodic sweep of overdue transactions

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use super::TransactionTracker;

/// Drives [`TransactionTracker::sweep_timeouts`] on a fixed interval
pub struct TimeoutSweeper {
    tracker: Arc<TransactionTracker>,
    check_interval: Duration,
}

impl TimeoutSweeper {
    pub fn new(tracker: Arc<TransactionTracker>, check_interval: Duration) -> Self {
        Self {
            tracker,
            check_interval,
        }
    }

    /// Sweep until `shutdown` flips to true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let expired = self.tracker.sweep_timeouts().await;
                    if !expired.is_empty() {
                        debug!("Swept {} timed out transaction(s)", expired.len());
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
