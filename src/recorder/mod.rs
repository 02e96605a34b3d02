//! Recording orchestration modules.
//!
//! Covers capture process handles, ffmpeg launching, the per-agent session
//! state machine, and the background pair monitor.

pub mod handle;
pub mod launcher;
pub mod pair_monitor;
pub mod session;
pub mod session_manager;
