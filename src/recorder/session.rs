//! Recording session model: state machine and wire status tokens.

use chrono::{DateTime, Utc};

use crate::recorder::handle::CaptureHandle;

/// Lifecycle state of the one recording session an agent owns.
///
/// `Starting` and `Stopping` are only ever held while the session lock is
/// held, so external observers see `Idle` or `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No capture pair exists.
    Idle,
    /// Launching the capture pair.
    Starting,
    /// Both capture processes are presumed live.
    Running,
    /// Tearing the capture pair down.
    Stopping,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Single-line status token exchanged over the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusToken {
    /// A capture pair is active.
    Running,
    /// No capture pair is active.
    Idle,
    /// A stop request completed.
    Stopped,
    /// The request text was not recognized.
    Unknown,
}

impl StatusToken {
    /// Wire representation, without the trailing newline.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Idle => "IDLE",
            Self::Stopped => "STOPPED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for StatusToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two coupled capture processes, always present together.
#[derive(Debug)]
pub struct CapturePair {
    /// Screen capture leg.
    pub screen: CaptureHandle,
    /// Webcam capture leg.
    pub webcam: CaptureHandle,
}

impl CapturePair {
    /// Both legs as an iterator, screen first.
    pub fn legs(&mut self) -> impl Iterator<Item = &mut CaptureHandle> {
        [&mut self.screen, &mut self.webcam].into_iter()
    }
}

/// The single mutable unit of orchestration state per agent.
///
/// Invariant: the pair is present iff the state is `Running` (or mid
/// transition under the session lock); it is never half-present.
#[derive(Debug)]
pub struct RecordingSession {
    /// Current lifecycle state.
    pub state: SessionState,
    /// The paired handles, both present or both absent.
    pub pair: Option<CapturePair>,
    /// When the pair entered `Running`; `None` while idle.
    pub started_at: Option<DateTime<Utc>>,
}

impl RecordingSession {
    /// A fresh idle session, created once per agent process.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            pair: None,
            started_at: None,
        }
    }

    /// Externally visible status: `Running` iff a pair is active.
    #[must_use]
    pub fn status_token(&self) -> StatusToken {
        if self.state == SessionState::Running {
            StatusToken::Running
        } else {
            StatusToken::Idle
        }
    }

    /// Reset to idle, dropping any recorded start time.
    pub fn reset_to_idle(&mut self) {
        self.state = SessionState::Idle;
        self.pair = None;
        self.started_at = None;
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
