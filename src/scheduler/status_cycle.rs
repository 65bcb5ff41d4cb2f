use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};

use crate::{
    foundation::error::DisplayResult,
    status::{model::PlaybackStatus, source::StatusSource},
};

/// Committed status, shared read-only with the frame cycle.
pub type Snapshot = Arc<PlaybackStatus>;

/// Counters for the slow cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusStats {
    /// Fetches made before the first success, including that success.
    pub bootstrap_attempts: u64,
    /// Successful refreshes after bootstrap.
    pub refreshes: u64,
    /// Failed refreshes after bootstrap.
    pub failures: u64,
}

/// Slow cycle: polls a [`StatusSource`] and publishes each good result as the new snapshot.
///
/// A failed fetch leaves the published snapshot untouched.
pub struct StatusCycle<S> {
    source: S,
    tx: watch::Sender<Snapshot>,
    stats: StatusStats,
}

impl<S: StatusSource> StatusCycle<S> {
    /// Fetch until the first success, waiting `retry` between attempts.
    ///
    /// Returns the cycle and a receiver already holding that first snapshot.
    pub async fn bootstrap(mut source: S, retry: Duration) -> (Self, watch::Receiver<Snapshot>) {
        let mut attempts = 0u64;
        let first = loop {
            attempts += 1;
            match source.fetch().await {
                Ok(status) => break status,
                Err(e) => {
                    tracing::warn!(attempt = attempts, error = %e, "no status yet, retrying");
                    tokio::time::sleep(retry).await;
                }
            }
        };
        tracing::info!(
            attempts,
            artist = %first.artist,
            song = %first.song,
            "first status received"
        );

        let (tx, rx) = watch::channel(Arc::new(first));
        let cycle = Self {
            source,
            tx,
            stats: StatusStats {
                bootstrap_attempts: attempts,
                ..StatusStats::default()
            },
        };
        (cycle, rx)
    }

    /// Another receiver of the published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Snapshot currently published.
    pub fn current(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Counters so far.
    pub fn stats(&self) -> StatusStats {
        self.stats
    }

    /// Underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// One fetch. On success the snapshot is replaced; on failure it is kept and the error
    /// returned after being logged.
    pub async fn refresh(&mut self) -> DisplayResult<()> {
        match self.source.fetch().await {
            Ok(status) => {
                let changed = **self.tx.borrow() != status;
                self.tx.send_replace(Arc::new(status));
                self.stats.refreshes += 1;
                tracing::debug!(changed, "status snapshot committed");
                Ok(())
            }
            Err(e) => {
                self.stats.failures += 1;
                tracing::warn!(error = %e, "status refresh failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    /// Refresh every `period` until every receiver is gone, then hand back the counters.
    ///
    /// The first refresh happens one full period after the call.
    pub async fn run(mut self, period: Duration) -> StatusStats {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if self.tx.is_closed() {
                break;
            }
            let _ = self.refresh().await;
        }
        tracing::debug!(stats = ?self.stats, "status cycle stopped");
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/status_cycle.rs"]
mod tests;
