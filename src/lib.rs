//! # boltwire
//!
//! Wire protocol layer for Bolt RPC framing:
//! - V1 and V2 frame codecs sharing one listener
//! - Streaming decode: partial frames wait, pipelined frames drain in order
//! - Optional CRC32 trailer on V2 frames
//! - Heartbeats answered inside the codec layer
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (one thread per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Protocol Registry                            │
//! │            (first byte → Protocol descriptor)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  V1 Codec   │          │  V2 Codec   │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼ Command
//!               ┌───────────────┐     heartbeat → ack
//!               │Command Handler├──────────────────────▶ encode
//!               └───────┬───────┘
//!                       ▼ everything else
//!               ┌───────────────┐
//!               │    Router     │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BoltError, Result};
pub use config::Config;
pub use protocol::{Command, Registry};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of boltwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
