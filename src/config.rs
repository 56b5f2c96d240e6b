//! Configuration for boltwire
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{BoltError, Result};

/// Main configuration for a Bolt listener and its codecs
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// Largest frame (fixed header + spans + CRC trailer) a decoder accepts.
    /// A declared length above this is treated as a corrupted length field.
    pub max_frame_size: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Routing Configuration
    // -------------------------------------------------------------------------
    /// How long a connection waits for the routing layer to answer
    pub route_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_frame_size: 16 * 1024 * 1024, // 16 MB
            listen_addr: "127.0.0.1:12200".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            route_timeout_ms: 3000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings that would make every connection fail
    pub fn validate(&self) -> Result<()> {
        // The smallest possible frame is a V1 response header.
        if self.max_frame_size < crate::protocol::RESPONSE_HEADER_LEN_V1 {
            return Err(BoltError::Config(format!(
                "max_frame_size {} is smaller than any Bolt header",
                self.max_frame_size
            )));
        }
        if self.max_connections == 0 {
            return Err(BoltError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.listen_addr.is_empty() {
            return Err(BoltError::Config("listen_addr is empty".to_string()));
        }
        Ok(())
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_millis(self.route_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum accepted frame size (in bytes)
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set how long to wait on the routing layer (in milliseconds)
    pub fn route_timeout_ms(mut self, ms: u64) -> Self {
        self.config.route_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
