//! Session lifecycle manager: serialized start/stop/status over the one
//! recording session an agent owns.
//!
//! Every operation holds the session mutex for its full duration, including
//! the post-launch liveness probe and the graceful/forced stop sequence, so
//! two starts can never both spawn and start/stop never interleave. Spawn
//! and shutdown failures are absorbed here: callers always get a status
//! token back, never an error, and the session always lands on `Idle` after
//! a stop attempt.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};

use crate::config::TimeoutConfig;
use crate::recorder::handle::{CaptureHandle, CaptureRole};
use crate::recorder::launcher::CaptureLauncher;
use crate::recorder::session::{CapturePair, RecordingSession, SessionState, StatusToken};

/// Serializes all transitions of one [`RecordingSession`].
pub struct SessionManager {
    session: Mutex<RecordingSession>,
    launcher: Arc<dyn CaptureLauncher>,
    timeouts: TimeoutConfig,
}

impl SessionManager {
    /// Build a manager around a launcher and the configured deadlines.
    #[must_use]
    pub fn new(launcher: Arc<dyn CaptureLauncher>, timeouts: TimeoutConfig) -> Self {
        Self {
            session: Mutex::new(RecordingSession::new()),
            launcher,
            timeouts,
        }
    }

    /// Start the capture pair.
    ///
    /// Idempotent: when the session is not idle this is a no-op returning
    /// the current status. On any launch or probe failure the partially
    /// started pair is torn down and the session returns to idle; the
    /// failure is reported through the token and the log, never raised.
    pub async fn start(&self) -> StatusToken {
        let mut session = self.session.lock().await;
        let span = info_span!("start_session");

        async {
            if session.state != SessionState::Idle {
                info!(state = %session.state, "start ignored: session already active");
                return session.status_token();
            }
            session.state = SessionState::Starting;

            let mut screen = match self.launcher.launch(CaptureRole::Screen) {
                Ok(handle) => handle,
                Err(err) => {
                    warn!(%err, "screen capture failed to launch");
                    session.reset_to_idle();
                    return StatusToken::Idle;
                }
            };

            let mut webcam = match self.launcher.launch(CaptureRole::Webcam) {
                Ok(handle) => handle,
                Err(err) => {
                    warn!(%err, "webcam capture failed to launch, rolling back screen");
                    discard(&mut screen, &self.timeouts).await;
                    session.reset_to_idle();
                    return StatusToken::Idle;
                }
            };

            // Short probe: a capture that dies within this window counts as
            // a failed start, not a running session.
            tokio::time::sleep(self.timeouts.probe()).await;

            let screen_alive = screen.is_alive();
            let webcam_alive = webcam.is_alive();
            if !screen_alive || !webcam_alive {
                warn!(
                    screen_alive,
                    webcam_alive, "capture exited during liveness probe, rolling back pair"
                );
                discard(&mut screen, &self.timeouts).await;
                discard(&mut webcam, &self.timeouts).await;
                session.reset_to_idle();
                return StatusToken::Idle;
            }

            session.pair = Some(CapturePair { screen, webcam });
            session.state = SessionState::Running;
            session.started_at = Some(Utc::now());
            info!("recording started");
            StatusToken::Running
        }
        .instrument(span)
        .await
    }

    /// Stop the capture pair.
    ///
    /// Idempotent: stopping an idle session is a no-op. Each leg is stopped
    /// independently with bounded escalation (stop token, graceful wait,
    /// forced kill, abandon-with-log); the session always ends idle.
    pub async fn stop(&self) -> StatusToken {
        let mut session = self.session.lock().await;
        let span = info_span!("stop_session");

        async {
            if session.state == SessionState::Idle {
                info!("stop ignored: session already idle");
                return StatusToken::Stopped;
            }
            session.state = SessionState::Stopping;

            if let Some(mut pair) = session.pair.take() {
                for handle in pair.legs() {
                    shutdown_leg(handle, &self.timeouts).await;
                }
            }

            session.reset_to_idle();
            info!("recording stopped");
            StatusToken::Stopped
        }
        .instrument(span)
        .await
    }

    /// Current status: `Running` iff a pair is active. Never touches
    /// process I/O.
    pub async fn status(&self) -> StatusToken {
        self.session.lock().await.status_token()
    }

    /// When the session is running, poll both legs; if either has exited
    /// spontaneously, tear the survivor down and return the session to
    /// idle. Returns `true` when a teardown happened.
    ///
    /// A half-dead pair must never be reported as `Running`, so the pair
    /// monitor calls this on an interval.
    pub async fn reap_dead_pair(&self) -> bool {
        let mut session = self.session.lock().await;
        if session.state != SessionState::Running {
            return false;
        }
        let Some(pair) = session.pair.as_mut() else {
            return false;
        };

        let screen_alive = pair.screen.is_alive();
        let webcam_alive = pair.webcam.is_alive();
        if screen_alive && webcam_alive {
            return false;
        }

        warn!(
            screen_alive,
            webcam_alive, "capture pair partially exited, tearing down survivor"
        );
        if let Some(mut pair) = session.pair.take() {
            for handle in pair.legs() {
                if handle.is_alive() {
                    shutdown_leg(handle, &self.timeouts).await;
                }
            }
        }
        session.reset_to_idle();
        true
    }
}

/// Stop one leg with bounded escalation: graceful token, graceful wait,
/// forced kill with its own wait, abandon as last resort.
async fn shutdown_leg(handle: &mut CaptureHandle, timeouts: &TimeoutConfig) {
    let role = handle.role();

    if !handle.is_alive() {
        info!(role = %role, "capture already exited");
        return;
    }

    let graceful = match handle.send_stop_token().await {
        Ok(()) => match handle.wait_for_exit(timeouts.graceful_stop()).await {
            Ok(Some(status)) => {
                info!(role = %role, ?status, "capture exited gracefully");
                true
            }
            Ok(None) => {
                warn!(role = %role, "graceful-stop deadline exceeded, forcing termination");
                false
            }
            Err(err) => {
                warn!(role = %role, %err, "error waiting for capture exit, forcing termination");
                false
            }
        },
        Err(err) => {
            warn!(role = %role, %err, "stop token delivery failed, forcing termination");
            false
        }
    };

    if !graceful && !handle.force_terminate(timeouts.kill()).await {
        warn!(role = %role, "capture survived forced termination, abandoning");
    }
}

/// Rollback teardown for a handle that never reached `Running`: forced
/// termination only, no graceful attempt.
async fn discard(handle: &mut CaptureHandle, timeouts: &TimeoutConfig) {
    if handle.is_alive() && !handle.force_terminate(timeouts.kill()).await {
        warn!(role = %handle.role(), "rollback kill did not confirm exit");
    }
}
