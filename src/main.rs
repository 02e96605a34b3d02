#![forbid(unsafe_code)]

//! `fleetrec-agent` — per-machine recording agent binary.
//!
//! Bootstraps configuration, builds the ffmpeg launcher and session
//! manager, and serves the TCP command server until a shutdown signal
//! arrives. Shutdown always stops any running capture pair.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use fleetrec::config::GlobalConfig;
use fleetrec::recorder::launcher::FfmpegLauncher;
use fleetrec::recorder::pair_monitor::{spawn_pair_monitor, POLL_INTERVAL};
use fleetrec::recorder::session_manager::SessionManager;
use fleetrec::server::command_server;
use fleetrec::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "fleetrec-agent", about = "Paired-capture recording agent", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("fleetrec-agent bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    info!(listen_addr = %config.listen_addr, port = config.port, "configuration loaded");

    // ── Build session manager ───────────────────────────
    let launcher = Arc::new(FfmpegLauncher::new(config.capture.clone()));
    let manager = Arc::new(SessionManager::new(launcher, config.timeouts.clone()));

    // ── Start server and pair monitor ───────────────────
    let ct = CancellationToken::new();
    let listener = command_server::bind(&config.listen_addr, config.port).await?;
    let server_handle =
        command_server::spawn_command_server(listener, Arc::clone(&manager), ct.clone());
    let monitor_handle = spawn_pair_monitor(Arc::clone(&manager), POLL_INTERVAL, ct.clone());
    info!("agent ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    // The server's final stop() runs inside its task; wait for both.
    let _ = tokio::join!(server_handle, monitor_handle);
    info!("fleetrec-agent shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
