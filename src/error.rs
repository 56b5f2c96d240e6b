//! Error types for boltwire
//!
//! Provides a unified error type for codec, registry and network operations.
//! `Incomplete` is not an error: it is reported through `Decoded::Incomplete`.

use thiserror::Error;

/// Result type alias using BoltError
pub type Result<T> = std::result::Result<T, BoltError>;

/// Unified error type for boltwire operations
#[derive(Debug, Error)]
pub enum BoltError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Decode Errors (fatal for the connection)
    // -------------------------------------------------------------------------
    #[error("Malformed frame: {0}")]
    Malformed(String),

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("Unknown protocol code: 0x{0:02x}")]
    UnknownProtocol(u8),

    #[error("Protocol code 0x{0:02x} is already registered")]
    DuplicateProtocol(u8),

    // -------------------------------------------------------------------------
    // Encode Errors (caller contract violations)
    // -------------------------------------------------------------------------
    #[error("Wrong command shape: {0}")]
    WrongCommandShape(String),

    #[error("Field overflow: {field} is {len} bytes (max {max})")]
    FieldOverflow {
        field: &'static str,
        len: usize,
        max: usize,
    },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BoltError {
    /// Whether the error leaves the byte stream uninterpretable
    pub fn is_fatal_for_connection(&self) -> bool {
        matches!(
            self,
            BoltError::Malformed(_) | BoltError::UnknownProtocol(_) | BoltError::Io(_)
        )
    }
}
