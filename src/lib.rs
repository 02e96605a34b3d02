#![forbid(unsafe_code)]

//! `fleetrec` — remote start/stop control for paired screen+webcam captures.
//!
//! Each agent machine runs a session manager owning one recording session
//! (a coupled pair of ffmpeg processes) behind a plain-text TCP command
//! server. A controller fans `start`/`stop` out to the whole fleet and
//! reports one outcome per agent.

pub mod config;
pub mod controller;
pub mod errors;
pub mod recorder;
pub mod server;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
