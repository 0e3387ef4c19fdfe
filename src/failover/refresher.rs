//! Periodic pool refresh driver.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::pool::PoolRegistry;

/// Resyncs the pool from the record store on its own, slower, interval.
pub struct PoolRefresher {
    registry: Arc<PoolRegistry>,
    interval: Duration,
}

impl PoolRefresher {
    pub fn new(registry: Arc<PoolRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Refresh every `interval` until shutdown. The first refresh happens one
    /// interval from now; the initial load is done at startup.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Pool refresher starting");

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Errors are logged by the registry; the next tick retries.
                    let _ = self.registry.refresh().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Pool refresher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
