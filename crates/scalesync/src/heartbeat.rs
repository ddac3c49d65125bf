//! Periodic liveness log line

use std::time::Duration;

use scalesync_core::RegistryReader;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Log the registry size every `period`
///
/// The task ends when the reconciler is gone.
pub fn spawn(reader: RegistryReader, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match reader.host_count().await {
                Ok(hosts) => info!(hosts, "heartbeat"),
                Err(e) => {
                    warn!(error = %e, "heartbeat stopping");
                    break;
                }
            }
        }
    })
}
