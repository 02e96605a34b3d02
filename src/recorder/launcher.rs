//! Capture process launching and ffmpeg command construction.
//!
//! The [`CaptureLauncher`] trait is the seam between the session state
//! machine and the outside world: the session manager only ever asks for
//! "a handle for this role" and never sees device selection or argument
//! construction. Production uses [`FfmpegLauncher`]; tests substitute
//! scripted processes.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::process::Command;
use tracing::info;

use crate::config::CaptureConfig;
use crate::recorder::handle::{CaptureHandle, CaptureRole};
use crate::{AppError, Result};

/// Launches one capture process per call.
pub trait CaptureLauncher: Send + Sync {
    /// Launch the process for `role` and return its handle.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Spawn` if the process cannot be started.
    fn launch(&self, role: CaptureRole) -> Result<CaptureHandle>;
}

/// Launches ffmpeg captures configured from the `[capture]` config section.
///
/// Each launch writes `screen_<timestamp>.mp4` / `webcam_<timestamp>.mp4`
/// plus a matching `.log` file into the configured output directory.
pub struct FfmpegLauncher {
    config: CaptureConfig,
}

impl FfmpegLauncher {
    /// Build a launcher from capture configuration.
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

impl CaptureLauncher for FfmpegLauncher {
    fn launch(&self, role: CaptureRole) -> Result<CaptureHandle> {
        let output_dir = resolve_output_dir(&self.config.output_dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let output = output_dir.join(format!("{role}_{stamp}.mp4"));
        let log_path = output_dir.join(format!("{role}_{stamp}.log"));

        let args = match role {
            CaptureRole::Screen => screen_args(&self.config, &output),
            CaptureRole::Webcam => webcam_args(&self.config, &output),
        };

        let mut command = Command::new("ffmpeg");
        command.args(&args);

        let handle = CaptureHandle::spawn(role, &mut command, &log_path)?;
        info!(role = %role, output = %output.display(), "ffmpeg capture launched");
        Ok(handle)
    }
}

/// Resolve and create the output directory for recordings and logs.
///
/// # Errors
///
/// Returns `AppError::Spawn` if the directory cannot be created.
pub fn resolve_output_dir(configured: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(configured)
        .map_err(|err| AppError::Spawn(format!("cannot create output dir: {err}")))?;
    Ok(configured.to_path_buf())
}

/// ffmpeg arguments for the screen leg: desktop grab at the configured
/// framerate, optional audio device, `libx264 ultrafast`.
#[must_use]
pub fn screen_args(config: &CaptureConfig, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into()];

    if cfg!(windows) {
        args.extend([
            "-f".into(),
            "gdigrab".into(),
            "-framerate".into(),
            config.framerate.to_string(),
            "-i".into(),
            "desktop".into(),
        ]);
    } else {
        args.extend([
            "-f".into(),
            "x11grab".into(),
            "-framerate".into(),
            config.framerate.to_string(),
            "-i".into(),
            ":0.0".into(),
        ]);
    }

    let audio = config.screen_audio_device.trim();
    if audio.is_empty() {
        args.extend([
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "ultrafast".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-an".into(),
        ]);
    } else {
        if cfg!(windows) {
            args.extend(["-f".into(), "dshow".into(), "-i".into(), format!("audio={audio}")]);
        } else {
            args.extend(["-f".into(), "pulse".into(), "-i".into(), audio.into()]);
        }
        args.extend([
            "-map".into(),
            "0:v".into(),
            "-map".into(),
            "1:a".into(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "ultrafast".into(),
            "-c:a".into(),
            "aac".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ]);
    }

    args.push(output.to_string_lossy().into_owned());
    args
}

/// ffmpeg arguments for the webcam leg: configured video device with an
/// optional microphone input.
#[must_use]
pub fn webcam_args(config: &CaptureConfig, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into()];
    let video = config.webcam_device.trim();
    let audio = config.webcam_audio_device.trim();

    if cfg!(windows) {
        // dshow takes both devices in a single combined input.
        let input = if audio.is_empty() {
            format!("video={video}")
        } else {
            format!("video={video}:audio={audio}")
        };
        args.extend(["-f".into(), "dshow".into(), "-i".into(), input]);
        args.extend(["-c:v".into(), "libx264".into(), "-preset".into(), "ultrafast".into()]);
        if !audio.is_empty() {
            args.extend(["-c:a".into(), "aac".into()]);
        }
    } else {
        args.extend(["-f".into(), "v4l2".into(), "-i".into(), video.into()]);
        if audio.is_empty() {
            args.extend([
                "-c:v".into(),
                "libx264".into(),
                "-preset".into(),
                "ultrafast".into(),
                "-an".into(),
            ]);
        } else {
            args.extend(["-f".into(), "pulse".into(), "-i".into(), audio.into()]);
            args.extend([
                "-map".into(),
                "0:v".into(),
                "-map".into(),
                "1:a".into(),
                "-c:v".into(),
                "libx264".into(),
                "-preset".into(),
                "ultrafast".into(),
                "-c:a".into(),
                "aac".into(),
            ]);
        }
    }

    args.push(output.to_string_lossy().into_owned());
    args
}
