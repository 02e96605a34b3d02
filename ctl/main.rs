#![forbid(unsafe_code)]

//! `fleetrec-ctl` — operator CLI companion for `fleetrec-agent`.
//!
//! Fans a `start` or `stop` command out to the configured fleet and prints
//! one outcome line per agent, in the order they were configured.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};

use fleetrec::config::GlobalConfig;
use fleetrec::controller::dispatcher::broadcast;
use fleetrec::controller::endpoint::AgentEndpoint;

#[derive(Debug, Parser)]
#[command(
    name = "fleetrec-ctl",
    about = "Fleet controller for fleetrec recording agents",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file listing the fleet under
    /// `[controller] agents`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Agent endpoint as `host` or `host:port`; repeatable. Overrides the
    /// config file's fleet when given.
    #[arg(long = "agent")]
    agents: Vec<String>,

    /// Per-agent round-trip timeout in seconds; overrides the config value.
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start recording on every agent.
    Start,
    /// Stop recording on every agent.
    Stop,
}

impl Command {
    fn wire_text(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

fn main() {
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => match GlobalConfig::load_from_path(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config: {err}");
                std::process::exit(1);
            }
        },
        None => GlobalConfig::default(),
    };

    let raw_agents = if args.agents.is_empty() {
        config.controller.agents.clone()
    } else {
        args.agents.clone()
    };
    if raw_agents.is_empty() {
        eprintln!("No agents configured. Pass --agent host[:port] or list them under [controller] agents.");
        std::process::exit(1);
    }

    let mut endpoints = Vec::with_capacity(raw_agents.len());
    for raw in &raw_agents {
        match AgentEndpoint::from_str(raw) {
            Ok(endpoint) => endpoints.push(endpoint),
            Err(err) => {
                eprintln!("Invalid agent endpoint '{raw}': {err}");
                std::process::exit(1);
            }
        }
    }

    let deadline = args
        .timeout
        .map_or_else(|| config.timeouts.broadcast(), Duration::from_secs);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to build tokio runtime: {err}");
            std::process::exit(1);
        }
    };

    let outcomes = runtime.block_on(broadcast(&endpoints, args.command.wire_text(), deadline));

    let mut failures = 0;
    for outcome in &outcomes {
        println!("{}", outcome.report_line());
        if !outcome.is_success() {
            failures += 1;
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} agent(s) failed", outcomes.len());
        std::process::exit(1);
    }
}
