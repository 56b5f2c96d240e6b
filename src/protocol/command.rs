//! Command definitions
//!
//! Plain data for Bolt requests and responses. A command is built fresh for
//! every decoded frame and is never mutated after decoding.

use bytes::Bytes;

use crate::error::{BoltError, Result};
use super::{PROTOCOL_CODE_V1, PROTOCOL_CODE_V2, SWITCH_CRC};

/// Command types (`type` byte on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandType {
    Request = 0x00,
    Response = 0x01,
    RequestOneway = 0x02,
}

impl TryFrom<u8> for CommandType {
    type Error = BoltError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(CommandType::Request),
            0x01 => Ok(CommandType::Response),
            0x02 => Ok(CommandType::RequestOneway),
            _ => Err(BoltError::Malformed(format!(
                "Unknown command type: 0x{:02x}",
                value
            ))),
        }
    }
}

/// Command codes (`cmdcode` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CommandCode {
    /// Liveness probe, answered locally
    Heartbeat = 0x0001,
    RpcRequest = 0x0002,
    RpcResponse = 0x0003,
}

impl TryFrom<u16> for CommandCode {
    type Error = BoltError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x0001 => Ok(CommandCode::Heartbeat),
            0x0002 => Ok(CommandCode::RpcRequest),
            0x0003 => Ok(CommandCode::RpcResponse),
            _ => Err(BoltError::Malformed(format!(
                "Unknown command code: 0x{:04x}",
                value
            ))),
        }
    }
}

/// Response status codes
///
/// Passed through verbatim; values outside the named set are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseStatus(pub u16);

impl ResponseStatus {
    pub const SUCCESS: Self = Self(0x0000);
    pub const ERROR: Self = Self(0x0001);
    pub const SERVER_EXCEPTION: Self = Self(0x0002);
    pub const UNKNOWN: Self = Self(0x0003);
    pub const SERVER_THREADPOOL_BUSY: Self = Self(0x0004);
    pub const ERROR_COMM: Self = Self(0x0005);
    pub const NO_PROCESSOR: Self = Self(0x0006);
    pub const TIMEOUT: Self = Self(0x0007);
    pub const CLIENT_SEND_ERROR: Self = Self(0x0008);
    pub const CODEC_EXCEPTION: Self = Self(0x0009);
    pub const CONNECTION_CLOSED: Self = Self(0x0010);
    pub const SERVER_SERIAL_EXCEPTION: Self = Self(0x0011);
    pub const SERVER_DESERIAL_EXCEPTION: Self = Self(0x0012);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

/// Frame layout a command is carried in
///
/// V2 adds the layout minor version (`ver1`) and the function switch byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameVersion {
    V1,
    V2 { protocol_version: u8, switch: u8 },
}

impl FrameVersion {
    /// The discriminator byte that starts every frame of this layout
    pub fn protocol_code(self) -> u8 {
        match self {
            FrameVersion::V1 => PROTOCOL_CODE_V1,
            FrameVersion::V2 { .. } => PROTOCOL_CODE_V2,
        }
    }

    /// Whether frames of this layout carry a CRC32 trailer
    pub fn has_crc(self) -> bool {
        match self {
            FrameVersion::V1 => false,
            FrameVersion::V2 {
                protocol_version,
                switch,
            } => protocol_version > 1 && switch & SWITCH_CRC != 0,
        }
    }
}

/// The four frame shapes codecs branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameShape {
    V1Request,
    V1Response,
    V2Request,
    V2Response,
}

/// A Bolt request (REQUEST or REQUEST_ONEWAY)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCommand {
    pub frame: FrameVersion,
    pub cmd_type: CommandType,
    pub cmd_code: CommandCode,
    /// Command semantic version (`ver2`)
    pub version: u8,
    pub request_id: u32,
    /// Body serializer id, opaque here
    pub codec: u8,
    /// Milliseconds, -1 = no timeout
    pub timeout: i32,
    pub class_name: Bytes,
    pub header: Bytes,
    pub content: Bytes,
}

impl RequestCommand {
    /// A two-way request with empty spans
    pub fn new(frame: FrameVersion, cmd_code: CommandCode, request_id: u32) -> Self {
        Self {
            frame,
            cmd_type: CommandType::Request,
            cmd_code,
            version: 1,
            request_id,
            codec: 0,
            timeout: -1,
            class_name: Bytes::new(),
            header: Bytes::new(),
            content: Bytes::new(),
        }
    }

    pub fn is_oneway(&self) -> bool {
        self.cmd_type == CommandType::RequestOneway
    }
}

/// A Bolt response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCommand {
    pub frame: FrameVersion,
    pub cmd_code: CommandCode,
    /// Command semantic version (`ver2`)
    pub version: u8,
    pub request_id: u32,
    /// Body serializer id, opaque here
    pub codec: u8,
    pub status: ResponseStatus,
    pub class_name: Bytes,
    pub header: Bytes,
    pub content: Bytes,
}

impl ResponseCommand {
    /// An empty-bodied response correlated to `request`
    ///
    /// Mirrors frame layout, version, codec and request id. Heartbeats are
    /// answered with a heartbeat code, everything else with RPC_RESPONSE.
    pub fn for_request(request: &RequestCommand, status: ResponseStatus) -> Self {
        let cmd_code = match request.cmd_code {
            CommandCode::Heartbeat => CommandCode::Heartbeat,
            _ => CommandCode::RpcResponse,
        };
        Self {
            frame: request.frame,
            cmd_code,
            version: request.version,
            request_id: request.request_id,
            codec: request.codec,
            status,
            class_name: Bytes::new(),
            header: Bytes::new(),
            content: Bytes::new(),
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Request(RequestCommand),
    Response(ResponseCommand),
}

impl Command {
    pub fn frame(&self) -> FrameVersion {
        match self {
            Command::Request(req) => req.frame,
            Command::Response(resp) => resp.frame,
        }
    }

    pub fn protocol_code(&self) -> u8 {
        self.frame().protocol_code()
    }

    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Request(req) => req.cmd_type,
            Command::Response(_) => CommandType::Response,
        }
    }

    pub fn command_code(&self) -> CommandCode {
        match self {
            Command::Request(req) => req.cmd_code,
            Command::Response(resp) => resp.cmd_code,
        }
    }

    pub fn request_id(&self) -> u32 {
        match self {
            Command::Request(req) => req.request_id,
            Command::Response(resp) => resp.request_id,
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        self.command_code() == CommandCode::Heartbeat
    }

    pub fn shape(&self) -> FrameShape {
        match (self, self.frame()) {
            (Command::Request(_), FrameVersion::V1) => FrameShape::V1Request,
            (Command::Response(_), FrameVersion::V1) => FrameShape::V1Response,
            (Command::Request(_), FrameVersion::V2 { .. }) => FrameShape::V2Request,
            (Command::Response(_), FrameVersion::V2 { .. }) => FrameShape::V2Response,
        }
    }
}

impl From<RequestCommand> for Command {
    fn from(req: RequestCommand) -> Self {
        Command::Request(req)
    }
}

impl From<ResponseCommand> for Command {
    fn from(resp: ResponseCommand) -> Self {
        Command::Response(resp)
    }
}
