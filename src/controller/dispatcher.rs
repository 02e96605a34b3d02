//! Broadcast dispatcher: fan one command out to a fleet of agents.
//!
//! One task per endpoint, capped at [`MAX_IN_FLIGHT`] concurrently. Every
//! task produces exactly one [`CommandOutcome`]; a dead or slow agent
//! yields a failure outcome after its deadline and never blocks the rest.
//! Results are collected into index-tagged slots so the output order always
//! matches the input order regardless of completion order.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::controller::endpoint::AgentEndpoint;

/// Concurrency ceiling for in-flight agent exchanges.
pub const MAX_IN_FLIGHT: usize = 32;

/// Result of sending one command to one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// The agent this outcome belongs to.
    pub endpoint: AgentEndpoint,
    /// Reply text on success, failure description otherwise.
    pub result: Result<String, String>,
}

impl CommandOutcome {
    /// Whether the agent replied.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// One human-readable report line, `host:port -> REPLY` or
    /// `host:port -> failure reason`.
    #[must_use]
    pub fn report_line(&self) -> String {
        match &self.result {
            Ok(reply) => format!("{} -> {reply}", self.endpoint),
            Err(reason) => format!("{} -> {reason}", self.endpoint),
        }
    }
}

/// Send `command` to every endpoint and report every agent's outcome.
///
/// Always returns one outcome per input endpoint, in input order; an empty
/// endpoint list returns immediately. `deadline` bounds each agent's full
/// connect-and-round-trip exchange.
pub async fn broadcast(
    endpoints: &[AgentEndpoint],
    command: &str,
    deadline: Duration,
) -> Vec<CommandOutcome> {
    if endpoints.is_empty() {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(endpoints.len().min(MAX_IN_FLIGHT)));
    let mut tasks = JoinSet::new();

    for (index, endpoint) in endpoints.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let command = command.to_owned();
        tasks.spawn(async move {
            // The semaphore is never closed, so acquisition only fails if
            // the runtime is tearing down; the exchange still runs bounded.
            let _permit = semaphore.acquire_owned().await.ok();
            let result = send_command(&endpoint, &command, deadline).await;
            (index, endpoint, result)
        });
    }

    let mut slots: Vec<Option<CommandOutcome>> = Vec::new();
    slots.resize_with(endpoints.len(), || None);

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, endpoint, result)) => {
                slots[index] = Some(CommandOutcome { endpoint, result });
            }
            Err(err) => {
                warn!(%err, "broadcast task failed to join");
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| CommandOutcome {
                endpoint: endpoints[index].clone(),
                result: Err("dispatch task failed".into()),
            })
        })
        .collect()
}

/// One bounded exchange: connect, send the command, read the single reply
/// line. Failures come back as descriptions, never as panics or errors
/// crossing the task boundary.
async fn send_command(
    endpoint: &AgentEndpoint,
    command: &str,
    deadline: Duration,
) -> Result<String, String> {
    match tokio::time::timeout(deadline, exchange(endpoint, command)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(format!("timed out after {}s", deadline.as_secs_f64())),
    }
}

async fn exchange(endpoint: &AgentEndpoint, command: &str) -> Result<String, String> {
    let mut stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|err| format!("connect failed: {err}"))?;

    stream
        .write_all(command.as_bytes())
        .await
        .map_err(|err| format!("send failed: {err}"))?;
    stream
        .flush()
        .await
        .map_err(|err| format!("send failed: {err}"))?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .map_err(|err| format!("read failed: {err}"))?;

    let reply = line.trim();
    if reply.is_empty() {
        return Err("agent closed the connection without a reply".into());
    }
    Ok(reply.to_owned())
}
