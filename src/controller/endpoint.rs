//! Agent endpoint addressing for the controller.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::config::DEFAULT_PORT;
use crate::AppError;

/// `(host, port)` identifying one controllable agent.
///
/// Immutable once parsed; carries no connection state. Parsed from `host`
/// or `host:port` (bracketed IPv6 literals are not supported).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEndpoint {
    /// Hostname or IPv4 address.
    pub host: String,
    /// Command server port.
    pub port: u16,
}

impl AgentEndpoint {
    /// Build an endpoint from parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for AgentEndpoint {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::Config("agent endpoint must not be empty".into()));
        }

        match raw.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(AppError::Config(format!(
                        "agent endpoint '{raw}' has an empty host"
                    )));
                }
                let port = port.parse::<u16>().map_err(|_| {
                    AppError::Config(format!("agent endpoint '{raw}' has an invalid port"))
                })?;
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(raw, DEFAULT_PORT)),
        }
    }
}

impl Display for AgentEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
