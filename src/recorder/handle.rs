//! Handle over one launched capture process.
//!
//! Wraps the child process together with its stdin channel (used to deliver
//! the graceful-stop token) and the log file its output is redirected to.
//! Children are spawned with `kill_on_drop(true)` so dropping a handle can
//! never leak a running capture.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::debug;

use crate::{AppError, Result};

/// Which leg of the paired capture a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRole {
    /// Desktop/screen capture.
    Screen,
    /// Webcam capture.
    Webcam,
}

impl CaptureRole {
    /// Short lowercase name used in filenames and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Webcam => "webcam",
        }
    }
}

impl std::fmt::Display for CaptureRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One live (or exited) capture process.
///
/// The handle exclusively owns the child's stdin and is the only writer to
/// the log file passed at spawn time; both are released when the handle is
/// dropped.
#[derive(Debug)]
pub struct CaptureHandle {
    role: CaptureRole,
    child: Child,
    stdin: Option<ChildStdin>,
    log_path: PathBuf,
}

impl CaptureHandle {
    /// Spawn `command` with stdin piped and stdout/stderr redirected to a
    /// log file at `log_path`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Spawn` if the log file cannot be created or the
    /// process fails to start.
    pub fn spawn(role: CaptureRole, command: &mut Command, log_path: &Path) -> Result<Self> {
        let log_file = std::fs::File::create(log_path)
            .map_err(|err| AppError::Spawn(format!("{role}: cannot create log file: {err}")))?;
        let stderr_file = log_file
            .try_clone()
            .map_err(|err| AppError::Spawn(format!("{role}: cannot clone log file: {err}")))?;

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(stderr_file))
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| AppError::Spawn(format!("{role}: failed to spawn: {err}")))?;

        let stdin = child.stdin.take();
        debug!(role = %role, pid = child.id().unwrap_or(0), "capture process spawned");

        Ok(Self {
            role,
            child,
            stdin,
            log_path: log_path.to_path_buf(),
        })
    }

    /// The leg this handle drives.
    #[must_use]
    pub fn role(&self) -> CaptureRole {
        self.role
    }

    /// OS process id, if the process has not yet been reaped.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Path of the log file receiving the process's output.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Non-blocking liveness check. A poll error counts as dead so a broken
    /// entry is cleaned up rather than kept forever.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Deliver the graceful-stop token (`q\n`, ffmpeg's quit key) over the
    /// process's stdin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if stdin is already closed or the write fails.
    pub async fn send_stop_token(&mut self) -> Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AppError::Io(format!("{}: stdin already closed", self.role)));
        };
        stdin.write_all(b"q\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Wait up to `deadline` for the process to exit. Returns `None` when the
    /// deadline elapses with the process still running.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if waiting on the process itself fails.
    pub async fn wait_for_exit(&mut self, deadline: Duration) -> Result<Option<ExitStatus>> {
        match tokio::time::timeout(deadline, self.child.wait()).await {
            Ok(Ok(status)) => Ok(Some(status)),
            Ok(Err(err)) => Err(AppError::Io(format!(
                "{}: wait failed: {err}",
                self.role
            ))),
            Err(_elapsed) => Ok(None),
        }
    }

    /// Forcibly terminate the process, waiting up to `deadline` for it to
    /// die. Returns `true` once the process is confirmed gone, `false` when
    /// it must be abandoned to the `kill_on_drop` backstop.
    pub async fn force_terminate(&mut self, deadline: Duration) -> bool {
        if let Err(err) = self.child.start_kill() {
            // Likely already exited; the wait below confirms either way.
            debug!(role = %self.role, %err, "start_kill reported an error");
        }
        matches!(self.wait_for_exit(deadline).await, Ok(Some(_)))
    }
}
