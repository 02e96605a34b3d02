//! Per-agent network surface: the TCP command server.

pub mod command_server;
