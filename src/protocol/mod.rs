//! Protocol Module
//!
//! Bolt wire protocol: two frame layouts that share one listener, told apart
//! by the first byte of every frame.
//!
//! ## Versions
//! - 0x01: V1 - 22 byte request header, 20 byte response header
//! - 0x02: V2 - 24 / 22 bytes, adds `ver1` and a function `switch` byte,
//!   optional CRC32 trailer
//!
//! ## Command Types
//! - 0x00: REQUEST
//! - 0x01: RESPONSE
//! - 0x02: REQUEST_ONEWAY
//!
//! ## Command Codes
//! - 0x0001: HEARTBEAT
//! - 0x0002: RPC_REQUEST
//! - 0x0003: RPC_RESPONSE

mod command;
mod codec;
mod v1;
mod v2;
mod heartbeat;
mod handler;
mod descriptor;
mod registry;

pub use command::{
    Command, CommandCode, CommandType, FrameShape, FrameVersion, RequestCommand,
    ResponseCommand, ResponseStatus,
};
pub use codec::{Decoded, Decoder, Encoder, CRC_TRAILER_LEN};
pub use v1::BoltV1Codec;
pub use v2::BoltV2Codec;
pub use heartbeat::{heartbeat, heartbeat_ack, HEARTBEAT_CODEC};
pub use handler::{BoltCommandHandler, CommandHandler, Router};
pub use descriptor::Protocol;
pub use registry::Registry;

// =============================================================================
// Wire Constants
// =============================================================================

/// Discriminator of V1 frames
pub const PROTOCOL_CODE_V1: u8 = 0x01;

/// Discriminator of V2 frames
pub const PROTOCOL_CODE_V2: u8 = 0x02;

pub const REQUEST_HEADER_LEN_V1: usize = 22;
pub const RESPONSE_HEADER_LEN_V1: usize = 20;
pub const REQUEST_HEADER_LEN_V2: usize = 24;
pub const RESPONSE_HEADER_LEN_V2: usize = 22;

/// Function switch bit enabling the CRC32 trailer (V2, `ver1 > 1`)
pub const SWITCH_CRC: u8 = 0x01;
