//! Direct-tcp destinations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Endpoint a direct-tcp channel asks the remote side to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpTarget {
    /// Destination host, resolved by the remote side.
    pub host: String,
    /// Destination TCP port.
    pub port: u16,
}

impl TcpTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for TcpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
