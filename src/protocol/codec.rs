//! Protocol codec
//!
//! Traits every Bolt frame codec implements plus the pieces V1 and V2 share:
//! the three span length fields and the span layout that follows the fixed
//! header.
//!
//! ## Variable Section
//! ```text
//! ┌──────────────┬──────────────┬─────────────────┬──────────────────┐
//! │ className    │ header map   │ content         │ CRC32 (V2, opt.) │
//! │ (classLen)   │ (headerLen)  │ (contentLen)    │ (4)              │
//! └──────────────┴──────────────┴─────────────────┴──────────────────┘
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BoltError, Result};
use super::{Command, CommandType, ResponseStatus};

/// Size of the optional CRC32 trailer
pub const CRC_TRAILER_LEN: usize = 4;

/// Outcome of a decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Not enough bytes yet; nothing was consumed
    Incomplete,

    /// One full frame; advance the buffer by `consumed`
    Frame { command: Command, consumed: usize },
}

/// Turns buffered bytes into commands
///
/// `buf` starts at the first unconsumed byte. Implementations hold no
/// per-connection state, so one instance is shared by every connection.
pub trait Decoder: Send + Sync {
    fn decode(&self, buf: &[u8]) -> Result<Decoded>;
}

/// Turns commands into bytes
pub trait Encoder: Send + Sync {
    /// Append the encoded frame to `dst`
    fn encode_to(&self, command: &Command, dst: &mut BytesMut) -> Result<()>;

    fn encode(&self, command: &Command) -> Result<Bytes> {
        let mut dst = BytesMut::new();
        self.encode_to(command, &mut dst)?;
        Ok(dst.freeze())
    }
}

// =============================================================================
// Span Lengths
// =============================================================================

/// classLen (2) + headerLen (2) + contentLen (4)
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpanLengths {
    pub class_len: usize,
    pub header_len: usize,
    pub content_len: usize,
}

impl SpanLengths {
    /// Read the three length fields, big-endian
    pub fn read(buf: &mut impl Buf) -> Self {
        let class_len = buf.get_u16() as usize;
        let header_len = buf.get_u16() as usize;
        let content_len = buf.get_u32() as usize;
        Self {
            class_len,
            header_len,
            content_len,
        }
    }

    /// Lengths of the given spans, rejecting any that overflow their field
    pub fn of(class_name: &[u8], header: &[u8], content: &[u8]) -> Result<Self> {
        check_width("classLen", class_name.len(), u16::MAX as usize)?;
        check_width("headerLen", header.len(), u16::MAX as usize)?;
        check_width("contentLen", content.len(), u32::MAX as usize)?;
        Ok(Self {
            class_len: class_name.len(),
            header_len: header.len(),
            content_len: content.len(),
        })
    }

    pub fn write(&self, dst: &mut impl BufMut) {
        dst.put_u16(self.class_len as u16);
        dst.put_u16(self.header_len as u16);
        dst.put_u32(self.content_len as u32);
    }

    pub fn total(&self) -> usize {
        self.class_len + self.header_len + self.content_len
    }
}

fn check_width(field: &'static str, len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(BoltError::FieldOverflow { field, len, max });
    }
    Ok(())
}

// =============================================================================
// Spans
// =============================================================================

/// The three variable spans of a decoded frame
pub(crate) struct Spans {
    pub class_name: Bytes,
    pub header: Bytes,
    pub content: Bytes,
}

impl Spans {
    /// Copy the frame once and slice the spans out of it
    ///
    /// `frame` must hold at least `fixed_len + lens.total()` bytes.
    pub fn split(frame: &[u8], fixed_len: usize, lens: &SpanLengths) -> Self {
        let owned = Bytes::copy_from_slice(&frame[fixed_len..fixed_len + lens.total()]);

        let header_start = lens.class_len;
        let content_start = header_start + lens.header_len;
        Self {
            class_name: owned.slice(..header_start),
            header: owned.slice(header_start..content_start),
            content: owned.slice(content_start..),
        }
    }

    pub fn write(dst: &mut BytesMut, class_name: &[u8], header: &[u8], content: &[u8]) {
        dst.put_slice(class_name);
        dst.put_slice(header);
        dst.put_slice(content);
    }
}

/// Reject a declared frame length above the configured maximum
pub(crate) fn check_frame_size(total: usize, max_frame_size: usize) -> Result<()> {
    if total > max_frame_size {
        return Err(BoltError::Malformed(format!(
            "Frame too large: {} bytes (max {})",
            total, max_frame_size
        )));
    }
    Ok(())
}

/// Reject a frame whose discriminator belongs to another codec
pub(crate) fn check_protocol_code(found: u8, expected: u8) -> Result<()> {
    if found != expected {
        return Err(BoltError::Malformed(format!(
            "Protocol code mismatch: expected 0x{:02x}, got 0x{:02x}",
            expected, found
        )));
    }
    Ok(())
}

/// The type-dependent fixed field: timeout for requests, status for responses
#[derive(Debug, Clone, Copy)]
pub(crate) enum TypedField {
    Timeout(i32),
    Status(ResponseStatus),
}

impl TypedField {
    pub fn read(cmd_type: CommandType, buf: &mut impl Buf) -> Self {
        match cmd_type {
            CommandType::Response => TypedField::Status(ResponseStatus(buf.get_u16())),
            CommandType::Request | CommandType::RequestOneway => TypedField::Timeout(buf.get_i32()),
        }
    }
}
