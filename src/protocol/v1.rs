//! Bolt V1 frame codec
//!
//! ## Request (22 byte fixed header)
//! ```text
//! 0     1     2           4     5                 9     10                14          16          18                22
//! ┌─────┬─────┬───────────┬─────┬─────────────────┬─────┬─────────────────┬───────────┬───────────┬─────────────────┐
//! │proto│type │ cmdcode   │ver2 │ requestId       │codec│ timeout         │ classLen  │ headerLen │ contentLen      │
//! └─────┴─────┴───────────┴─────┴─────────────────┴─────┴─────────────────┴───────────┴───────────┴─────────────────┘
//! ```
//!
//! ## Response (20 byte fixed header)
//! ```text
//! 0     1     2           4     5                 9     10          12          14          16                20
//! ┌─────┬─────┬───────────┬─────┬─────────────────┬─────┬───────────┬───────────┬───────────┬─────────────────┐
//! │proto│type │ cmdcode   │ver2 │ requestId       │codec│respstatus │ classLen  │ headerLen │ contentLen      │
//! └─────┴─────┴───────────┴─────┴─────────────────┴─────┴───────────┴───────────┴───────────┴─────────────────┘
//! ```
//!
//! Followed by className + header map + content. All integers big-endian.

use bytes::{Buf, BufMut, BytesMut};

use crate::config::Config;
use crate::error::{BoltError, Result};
use super::codec::{
    check_frame_size, check_protocol_code, Decoded, Decoder, Encoder, SpanLengths, Spans,
    TypedField,
};
use super::{
    Command, CommandCode, CommandType, FrameShape, FrameVersion, RequestCommand, ResponseCommand,
    PROTOCOL_CODE_V1, REQUEST_HEADER_LEN_V1, RESPONSE_HEADER_LEN_V1,
};

/// Encoder and decoder for V1 frames
#[derive(Debug, Clone)]
pub struct BoltV1Codec {
    max_frame_size: usize,
}

impl BoltV1Codec {
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

impl Default for BoltV1Codec {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// =============================================================================
// Decoding
// =============================================================================

impl Decoder for BoltV1Codec {
    fn decode(&self, buf: &[u8]) -> Result<Decoded> {
        // proto + type select the layout
        if buf.len() < 2 {
            return Ok(Decoded::Incomplete);
        }
        check_protocol_code(buf[0], PROTOCOL_CODE_V1)?;
        let cmd_type = CommandType::try_from(buf[1])?;

        let fixed_len = match cmd_type {
            CommandType::Response => RESPONSE_HEADER_LEN_V1,
            CommandType::Request | CommandType::RequestOneway => REQUEST_HEADER_LEN_V1,
        };
        if buf.len() < fixed_len {
            return Ok(Decoded::Incomplete);
        }

        let mut hdr = &buf[2..fixed_len];
        let cmd_code = CommandCode::try_from(hdr.get_u16())?;
        let version = hdr.get_u8();
        let request_id = hdr.get_u32();
        let codec = hdr.get_u8();
        let typed = TypedField::read(cmd_type, &mut hdr);
        let lens = SpanLengths::read(&mut hdr);

        let total = fixed_len + lens.total();
        check_frame_size(total, self.max_frame_size)?;
        if buf.len() < total {
            return Ok(Decoded::Incomplete);
        }

        let spans = Spans::split(buf, fixed_len, &lens);
        let command = match typed {
            TypedField::Status(status) => Command::Response(ResponseCommand {
                frame: FrameVersion::V1,
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
                frame: FrameVersion::V1,
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

impl Encoder for BoltV1Codec {
    fn encode_to(&self, command: &Command, dst: &mut BytesMut) -> Result<()> {
        match (command.shape(), command) {
            (FrameShape::V1Request, Command::Request(req)) => encode_request(req, dst),
            (FrameShape::V1Response, Command::Response(resp)) => encode_response(resp, dst),
            (shape, _) => Err(BoltError::WrongCommandShape(format!(
                "V1 codec cannot encode a {:?} command",
                shape
            ))),
        }
    }
}

fn encode_request(req: &RequestCommand, dst: &mut BytesMut) -> Result<()> {
    if req.cmd_type == CommandType::Response {
        return Err(BoltError::WrongCommandShape(
            "request command carries the RESPONSE type".to_string(),
        ));
    }
    let lens = SpanLengths::of(&req.class_name, &req.header, &req.content)?;

    dst.reserve(REQUEST_HEADER_LEN_V1 + lens.total());
    dst.put_u8(PROTOCOL_CODE_V1);
    dst.put_u8(req.cmd_type as u8);
    dst.put_u16(req.cmd_code as u16);
    dst.put_u8(req.version);
    dst.put_u32(req.request_id);
    dst.put_u8(req.codec);
    dst.put_i32(req.timeout);
    lens.write(dst);
    Spans::write(dst, &req.class_name, &req.header, &req.content);
    Ok(())
}

fn encode_response(resp: &ResponseCommand, dst: &mut BytesMut) -> Result<()> {
    let lens = SpanLengths::of(&resp.class_name, &resp.header, &resp.content)?;

    dst.reserve(RESPONSE_HEADER_LEN_V1 + lens.total());
    dst.put_u8(PROTOCOL_CODE_V1);
    dst.put_u8(CommandType::Response as u8);
    dst.put_u16(resp.cmd_code as u16);
    dst.put_u8(resp.version);
    dst.put_u32(resp.request_id);
    dst.put_u8(resp.codec);
    dst.put_u16(resp.status.0);
    lens.write(dst);
    Spans::write(dst, &resp.class_name, &resp.header, &resp.content);
    Ok(())
}
