//! TCP command server exposing the session manager to the controller.
//!
//! One exchange per connection: read a single whitespace-trimmed ASCII
//! command, dispatch it, write one `\n`-terminated status token, close.
//! There are no persistent sessions and no pipelining.
//!
//! ## Protocol
//!
//! Request: `start` or `stop`; anything else is unrecognized.
//! Response: one of `RUNNING`, `IDLE`, `STOPPED`, `UNKNOWN`.
//!
//! Connections are handled on independent tasks; the session manager's
//! internal lock is the sole serialization point. Shutdown is driven by a
//! `CancellationToken`: the loop stops accepting, in-flight operations run
//! to completion, and the server issues one final `stop()` so no capture
//! pair is left orphaned.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::recorder::session::StatusToken;
use crate::recorder::session_manager::SessionManager;
use crate::{AppError, Result};

/// Deadline for reading the command from an accepted connection.
const READ_DEADLINE: Duration = Duration::from_secs(10);

/// Bind the command server listener.
///
/// # Errors
///
/// Returns `AppError::Connection` if the address cannot be bound.
pub async fn bind(listen_addr: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((listen_addr, port))
        .await
        .map_err(|err| AppError::Connection(format!("cannot bind {listen_addr}:{port}: {err}")))
}

/// Spawn the accept loop on its own task.
///
/// Runs until `cancel` fires, then invokes `stop()` once on the session
/// manager before finishing.
#[must_use]
pub fn spawn_command_server(
    listener: TcpListener,
    manager: Arc<SessionManager>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let local = listener
        .local_addr()
        .map_or_else(|_| "unknown".into(), |addr| addr.to_string());

    tokio::spawn(async move {
        let span = info_span!("command_server", addr = %local);
        async move {
            info!("command server listening");
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("command server shutting down");
                        break;
                    }
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, peer)) => {
                                let manager = Arc::clone(&manager);
                                tokio::spawn(
                                    handle_connection(stream, manager)
                                        .instrument(info_span!("conn", peer = %peer)),
                                );
                            }
                            Err(err) => {
                                warn!(%err, "accept failed");
                            }
                        }
                    }
                }
            }

            // Leave no orphaned capture behind the shutting-down server.
            manager.stop().await;
        }
        .instrument(span)
        .await;
    })
}

/// Handle a single controller connection: one command, one reply.
async fn handle_connection(mut stream: TcpStream, manager: Arc<SessionManager>) {
    let mut buf = [0u8; 1024];
    let read = tokio::time::timeout(READ_DEADLINE, stream.read(&mut buf)).await;
    let n = match read {
        Ok(Ok(n)) => n,
        Ok(Err(err)) => {
            warn!(%err, "request read failed");
            return;
        }
        Err(_elapsed) => {
            warn!("request read timed out");
            return;
        }
    };

    let request = String::from_utf8_lossy(&buf[..n]);
    let command = request.trim();
    info!(command, "command received");

    let token = match command {
        "start" => manager.start().await,
        "stop" => manager.stop().await,
        _ => StatusToken::Unknown,
    };

    let reply = format!("{token}\n");
    if let Err(err) = stream.write_all(reply.as_bytes()).await {
        warn!(%err, "reply write failed");
        return;
    }
    if let Err(err) = stream.flush().await {
        warn!(%err, "reply flush failed");
    }
}
