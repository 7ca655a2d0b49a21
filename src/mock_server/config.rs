//! Mock server configuration.

use std::env;
use std::net::SocketAddr;

use crate::error::{FixtureError, Result};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:0";
const DEFAULT_UNMATCHED_STATUS: u16 = 501;

/// Settings for [`super::MockServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on. Port 0 picks a random free port.
    pub bind_addr: SocketAddr,
    /// Status returned when no active stub matches a request.
    pub unmatched_status: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            unmatched_status: DEFAULT_UNMATCHED_STATUS,
        }
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// Uses `WEBFIXTURES_BIND_ADDR` (defaults to `127.0.0.1:0`) and
    /// `WEBFIXTURES_UNMATCHED_STATUS` (defaults to `501`).
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr =
            lookup("WEBFIXTURES_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|e| {
            FixtureError::ConfigInvalid(format!("WEBFIXTURES_BIND_ADDR '{bind_addr}': {e}"))
        })?;

        let unmatched_status = match lookup("WEBFIXTURES_UNMATCHED_STATUS") {
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|status| (100..1000).contains(status))
                .ok_or_else(|| {
                    FixtureError::ConfigInvalid(format!(
                        "WEBFIXTURES_UNMATCHED_STATUS '{raw}' is not an HTTP status code"
                    ))
                })?,
            None => DEFAULT_UNMATCHED_STATUS,
        };

        Ok(Self {
            bind_addr,
            unmatched_status,
        })
    }

    /// Set the listen address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the status for unmatched requests.
    pub fn with_unmatched_status(mut self, status: u16) -> Self {
        self.unmatched_status = status;
        self
    }
}
