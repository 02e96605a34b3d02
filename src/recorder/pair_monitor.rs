//! Background pair monitor — detects a capture leg exiting spontaneously.
//!
//! A recording session must never report `Running` while only one of its
//! two processes is alive. This task polls the session on an interval and
//! asks the manager to reap a half-dead pair: the survivor is torn down and
//! the session returns to idle.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::recorder::session_manager::SessionManager;

/// Default interval between pair liveness polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Spawn a background task that polls the session every `interval` until
/// the `CancellationToken` fires.
#[must_use]
pub fn spawn_pair_monitor(
    manager: Arc<SessionManager>,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("pair monitor shutting down");
                    break;
                }
                () = tokio::time::sleep(interval) => {}
            }

            if manager.reap_dead_pair().await {
                info!("partially exited capture pair reaped");
            }
        }
    })
}
