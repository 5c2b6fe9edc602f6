//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! content = "public"          # Content root served over HTTP
//! interface = "0.0.0.0"       # Network interface to bind
//! port = 42250                # HTTP port; live reload uses port + 1
//! log_requests = false        # Print every parsed request
//! log_responses = false       # Print every serialized header block
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::Deserialize;

/// Development server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Content root directory. Relative paths resolve against the
    /// directory holding the config file.
    pub content: PathBuf,

    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number. The live reload channel always uses `port + 1`.
    pub port: u16,

    /// Log each parsed request together with its raw bytes.
    pub log_requests: bool,

    /// Log each serialized response header block.
    pub log_responses: bool,
}

impl ServeConfig {
    /// Port of the live reload websocket listener.
    ///
    /// Validation guarantees `port < u16::MAX`, so this never overflows.
    pub fn ws_port(&self) -> u16 {
        self.port.saturating_add(1)
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            content: PathBuf::from("."),
            interface: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 42250,
            log_requests: false,
            log_responses: false,
        }
    }
}
