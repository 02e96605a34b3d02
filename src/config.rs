//! Global configuration parsing, validation, and defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Default TCP port the command server listens on and agents are dialed at.
pub const DEFAULT_PORT: u16 = 5001;

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Capture device and output settings for the two ffmpeg legs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CaptureConfig {
    /// Directory recordings and capture logs are written to. Relative paths
    /// resolve against the agent's working directory; created on demand.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Screen capture framerate.
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// Audio device mixed into the screen leg. Empty disables audio.
    #[serde(default)]
    pub screen_audio_device: String,
    /// Webcam video device for the webcam leg.
    #[serde(default = "default_webcam_device")]
    pub webcam_device: String,
    /// Microphone device mixed into the webcam leg. Empty disables audio.
    #[serde(default)]
    pub webcam_audio_device: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("recordings")
}

fn default_framerate() -> u32 {
    30
}

fn default_webcam_device() -> String {
    if cfg!(windows) {
        "HD Webcam".into()
    } else {
        "/dev/video0".into()
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            framerate: default_framerate(),
            screen_audio_device: String::new(),
            webcam_device: default_webcam_device(),
            webcam_audio_device: String::new(),
        }
    }
}

/// Bounded deadlines for process lifecycle and network round trips.
///
/// Every blocking step in the session state machine and the dispatcher is
/// capped by one of these values; nothing waits unbounded.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// Seconds to wait for a capture process to exit after the stop token.
    #[serde(default = "default_graceful_stop_seconds")]
    pub graceful_stop_seconds: u64,
    /// Seconds to wait for a capture process to die after forced termination.
    #[serde(default = "default_kill_seconds")]
    pub kill_seconds: u64,
    /// Milliseconds to wait after launch before probing pair liveness.
    #[serde(default = "default_probe_millis")]
    pub probe_millis: u64,
    /// Seconds allowed for one full controller round trip to one agent.
    #[serde(default = "default_broadcast_seconds")]
    pub broadcast_seconds: u64,
}

fn default_graceful_stop_seconds() -> u64 {
    5
}

fn default_kill_seconds() -> u64 {
    3
}

fn default_probe_millis() -> u64 {
    500
}

fn default_broadcast_seconds() -> u64 {
    3
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            graceful_stop_seconds: default_graceful_stop_seconds(),
            kill_seconds: default_kill_seconds(),
            probe_millis: default_probe_millis(),
            broadcast_seconds: default_broadcast_seconds(),
        }
    }
}

impl TimeoutConfig {
    /// Graceful-stop deadline as a [`Duration`].
    #[must_use]
    pub fn graceful_stop(&self) -> Duration {
        Duration::from_secs(self.graceful_stop_seconds)
    }

    /// Forced-termination deadline as a [`Duration`].
    #[must_use]
    pub fn kill(&self) -> Duration {
        Duration::from_secs(self.kill_seconds)
    }

    /// Post-launch liveness probe delay as a [`Duration`].
    #[must_use]
    pub fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_millis)
    }

    /// Per-agent broadcast round-trip deadline as a [`Duration`].
    #[must_use]
    pub fn broadcast(&self) -> Duration {
        Duration::from_secs(self.broadcast_seconds)
    }
}

/// Controller-side settings: the fleet the dispatcher targets.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ControllerConfig {
    /// Agent endpoints as `host` or `host:port` strings, in dispatch order.
    #[serde(default)]
    pub agents: Vec<String>,
}

/// Global configuration parsed from `config.toml`.
///
/// Every field has a working default so an agent can run with no config
/// file at all, matching a bare `fleetrec-agent` invocation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Address the command server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Port the command server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Capture devices and output location.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Lifecycle and network deadlines.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Controller fleet definition.
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            capture: CaptureConfig::default(),
            timeouts: TimeoutConfig::default(),
            controller: ControllerConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.listen_addr.trim().is_empty() {
            return Err(AppError::Config("listen_addr must not be empty".into()));
        }

        if self.capture.framerate == 0 {
            return Err(AppError::Config(
                "capture.framerate must be greater than zero".into(),
            ));
        }

        if self.timeouts.graceful_stop_seconds == 0 || self.timeouts.kill_seconds == 0 {
            return Err(AppError::Config(
                "timeouts.graceful_stop_seconds and timeouts.kill_seconds must be greater than zero"
                    .into(),
            ));
        }

        if self.timeouts.broadcast_seconds == 0 {
            return Err(AppError::Config(
                "timeouts.broadcast_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
