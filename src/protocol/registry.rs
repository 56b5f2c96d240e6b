//! Protocol Registry
//!
//! Maps the discriminator byte at the start of every frame to its protocol.
//!
//! ## Lifecycle
//! - Populated once during startup, before any connection is accepted
//! - Read-only afterwards; the RwLock is only ever contended while registering

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{BoltError, Result};
use super::Protocol;

/// Discriminator → protocol table
#[derive(Debug, Default)]
pub struct Registry {
    protocols: RwLock<HashMap<u8, Arc<Protocol>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding Bolt V1 and V2
    pub fn with_bolt(config: &Config) -> Result<Self> {
        let registry = Self::new();
        registry.register(super::PROTOCOL_CODE_V1, Arc::new(Protocol::bolt_v1(config)))?;
        registry.register(super::PROTOCOL_CODE_V2, Arc::new(Protocol::bolt_v2(config)))?;
        Ok(registry)
    }

    /// Bind `code` to `protocol`
    ///
    /// Registering the same descriptor twice is a no-op; binding a different
    /// descriptor to a taken code fails with `DuplicateProtocol`.
    pub fn register(&self, code: u8, protocol: Arc<Protocol>) -> Result<()> {
        let mut protocols = self.protocols.write();
        if let Some(existing) = protocols.get(&code) {
            if Arc::ptr_eq(existing, &protocol) {
                return Ok(());
            }
            tracing::error!("Protocol code 0x{:02x} registered twice", code);
            return Err(BoltError::DuplicateProtocol(code));
        }

        tracing::debug!("Registered protocol 0x{:02x}", code);
        protocols.insert(code, protocol);
        Ok(())
    }

    /// Find the protocol for a frame's first byte
    pub fn lookup(&self, code: u8) -> Result<Arc<Protocol>> {
        self.protocols
            .read()
            .get(&code)
            .cloned()
            .ok_or(BoltError::UnknownProtocol(code))
    }

    /// Registered codes, ascending
    pub fn codes(&self) -> Vec<u8> {
        let mut codes: Vec<u8> = self.protocols.read().keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.protocols.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.read().is_empty()
    }
}
