//! Bolt V2 frame codec
//!
//! V2 inserts `ver1` (layout minor version) after the discriminator and a
//! function `switch` byte after `codec`. Offsets shift accordingly; the
//! response layout also moves `respstatus` ahead of the lengths.
//!
//! ## Request (24 byte fixed header)
//! ```text
//! 0     1     2     3           5     6                 10    11    12                16          18          20                24
//! ┌─────┬─────┬─────┬───────────┬─────┬─────────────────┬─────┬─────┬─────────────────┬───────────┬───────────┬─────────────────┐
//! │proto│ver1 │type │ cmdcode   │ver2 │ requestId       │codec│swtch│ timeout         │ classLen  │ headerLen │ contentLen      │
//! └─────┴─────┴─────┴───────────┴─────┴─────────────────┴─────┴─────┴─────────────────┴───────────┴───────────┴─────────────────┘
//! ```
//!
//! ## Response (22 byte fixed header)
//! ```text
//! 0     1     2     3           5     6                 10    11    12          14          16          18                22
//! ┌─────┬─────┬─────┬───────────┬─────┬─────────────────┬─────┬─────┬───────────┬───────────┬───────────┬─────────────────┐
//! │proto│ver1 │type │ cmdcode   │ver2 │ requestId       │codec│swtch│respstatus │ classLen  │ headerLen │ contentLen      │
//! └─────┴─────┴─────┴───────────┴─────┴─────────────────┴─────┴─────┴───────────┴───────────┴───────────┴─────────────────┘
//! ```
//!
//! Followed by className + header map + content, then a CRC32 over every
//! preceding byte of the frame when `ver1 > 1` and the CRC switch bit is set.

use bytes::{Buf, BufMut, BytesMut};

use crate::config::Config;
use crate::error::{BoltError, Result};
use super::codec::{
    check_frame_size, check_protocol_code, Decoded, Decoder, Encoder, SpanLengths, Spans,
    TypedField, CRC_TRAILER_LEN,
};
use super::{
    Command, CommandCode, CommandType, FrameShape, FrameVersion, RequestCommand, ResponseCommand,
    PROTOCOL_CODE_V2, REQUEST_HEADER_LEN_V2, RESPONSE_HEADER_LEN_V2,
};

/// Encoder and decoder for V2 frames
#[derive(Debug, Clone)]
pub struct BoltV2Codec {
    max_frame_size: usize,
}

impl BoltV2Codec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_frame_size)
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for BoltV2Codec {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// =============================================================================
// Decoding
// =============================================================================

impl Decoder for BoltV2Codec {
    fn decode(&self, buf: &[u8]) -> Result<Decoded> {
        // proto + ver1 + type select the layout
        if buf.len() < 3 {
            return Ok(Decoded::Incomplete);
        }
        check_protocol_code(buf[0], PROTOCOL_CODE_V2)?;
        let protocol_version = buf[1];
        let cmd_type = CommandType::try_from(buf[2])?;

        let fixed_len = match cmd_type {
            CommandType::Response => RESPONSE_HEADER_LEN_V2,
            CommandType::Request | CommandType::RequestOneway => REQUEST_HEADER_LEN_V2,
        };
        if buf.len() < fixed_len {
            return Ok(Decoded::Incomplete);
        }

        let mut hdr = &buf[3..fixed_len];
        let cmd_code = CommandCode::try_from(hdr.get_u16())?;
        let version = hdr.get_u8();
        let request_id = hdr.get_u32();
        let codec = hdr.get_u8();
        let switch = hdr.get_u8();
        let typed = TypedField::read(cmd_type, &mut hdr);
        let lens = SpanLengths::read(&mut hdr);

        let frame = FrameVersion::V2 {
            protocol_version,
            switch,
        };
        let body_end = fixed_len + lens.total();
        let total = if frame.has_crc() {
            body_end + CRC_TRAILER_LEN
        } else {
            body_end
        };
        check_frame_size(total, self.max_frame_size)?;
        if buf.len() < total {
            return Ok(Decoded::Incomplete);
        }

        // Only hashed once the whole frame is buffered.
        if frame.has_crc() {
            let expected = (&buf[body_end..total]).get_u32();
            let actual = crc32fast::hash(&buf[..body_end]);
            if expected != actual {
                return Err(BoltError::Malformed(format!(
                    "CRC mismatch: frame says 0x{:08x}, computed 0x{:08x}",
                    expected, actual
                )));
            }
        }

        let spans = Spans::split(buf, fixed_len, &lens);
        let command = match typed {
            TypedField::Status(status) => Command::Response(ResponseCommand {
                frame,
                cmd_code,
                version,
                request_id,
                codec,
                status,
                class_name: spans.class_name,
                header: spans.header,
                content: spans.content,
            }),
            TypedField::Timeout(timeout) => Command::Request(RequestCommand {
                frame,
                cmd_type,
                cmd_code,
                version,
                request_id,
                codec,
                timeout,
                class_name: spans.class_name,
                header: spans.header,
                content: spans.content,
            }),
        };

        Ok(Decoded::Frame {
            command,
            consumed: total,
        })
    }
}

// =============================================================================
// Encoding
// =============================================================================

impl Encoder for BoltV2Codec {
    fn encode_to(&self, command: &Command, dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();
        match (command.shape(), command) {
            (FrameShape::V2Request, Command::Request(req)) => encode_request(req, dst)?,
            (FrameShape::V2Response, Command::Response(resp)) => encode_response(resp, dst)?,
            (shape, _) => {
                return Err(BoltError::WrongCommandShape(format!(
                    "V2 codec cannot encode a {:?} command",
                    shape
                )))
            }
        }

        if command.frame().has_crc() {
            let crc = crc32fast::hash(&dst[start..]);
            dst.put_u32(crc);
        }
        Ok(())
    }
}

/// ver1 and switch of a V2 command
fn v2_fields(frame: FrameVersion) -> (u8, u8) {
    match frame {
        FrameVersion::V2 {
            protocol_version,
            switch,
        } => (protocol_version, switch),
        FrameVersion::V1 => (0, 0),
    }
}

fn encode_request(req: &RequestCommand, dst: &mut BytesMut) -> Result<()> {
    if req.cmd_type == CommandType::Response {
        return Err(BoltError::WrongCommandShape(
            "request command carries the RESPONSE type".to_string(),
        ));
    }
    let lens = SpanLengths::of(&req.class_name, &req.header, &req.content)?;
    let (protocol_version, switch) = v2_fields(req.frame);

    dst.reserve(REQUEST_HEADER_LEN_V2 + lens.total() + CRC_TRAILER_LEN);
    dst.put_u8(PROTOCOL_CODE_V2);
    dst.put_u8(protocol_version);
    dst.put_u8(req.cmd_type as u8);
    dst.put_u16(req.cmd_code as u16);
    dst.put_u8(req.version);
    dst.put_u32(req.request_id);
    dst.put_u8(req.codec);
    dst.put_u8(switch);
    dst.put_i32(req.timeout);
    lens.write(dst);
    Spans::write(dst, &req.class_name, &req.header, &req.content);
    Ok(())
}

fn encode_response(resp: &ResponseCommand, dst: &mut BytesMut) -> Result<()> {
    let lens = SpanLengths::of(&resp.class_name, &resp.header, &resp.content)?;
    let (protocol_version, switch) = v2_fields(resp.frame);

    dst.reserve(RESPONSE_HEADER_LEN_V2 + lens.total() + CRC_TRAILER_LEN);
    dst.put_u8(PROTOCOL_CODE_V2);
    dst.put_u8(protocol_version);
    dst.put_u8(CommandType::Response as u8);
    dst.put_u16(resp.cmd_code as u16);
    dst.put_u8(resp.version);
    dst.put_u32(resp.request_id);
    dst.put_u8(resp.codec);
    dst.put_u8(switch);
    dst.put_u16(resp.status.0);
    lens.write(dst);
    Spans::write(dst, &resp.class_name, &resp.header, &resp.content);
    Ok(())
}
