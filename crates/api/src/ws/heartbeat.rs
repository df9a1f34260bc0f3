//! Periodic heartbeat over all live WebSocket connections.
//!
//! Each tick pings every registered connection and evicts the ones whose
//! channel has closed without the receive loop cleaning up, so room member
//! sets never hold dead entries for longer than one interval.

use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Interval between heartbeat sweeps (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn the background heartbeat task for the given registry.
///
/// Runs until aborted; the server aborts it after draining connections on
/// shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        // The first tick fires immediately; skip it so a fresh server does
        // not sweep before any client had a chance to connect.
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = ws_manager.ping_all().await;
            let remaining = ws_manager.connection_count().await;
            if evicted > 0 {
                tracing::info!(evicted, remaining, "Evicted stale WebSocket connections");
            } else {
                tracing::debug!(remaining, "WebSocket heartbeat ping");
            }
        }
    })
}
