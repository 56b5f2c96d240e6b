//! Heartbeat commands
//!
//! Liveness probes and their acks. Heartbeats carry no body.

use bytes::Bytes;

use super::{
    CommandCode, CommandType, FrameVersion, RequestCommand, ResponseCommand, ResponseStatus,
};

/// Serializer id stamped on heartbeats; there is no body to serialize
pub const HEARTBEAT_CODEC: u8 = 0x00;

/// A V1 heartbeat probe
pub fn heartbeat(request_id: u32) -> RequestCommand {
    RequestCommand {
        frame: FrameVersion::V1,
        cmd_type: CommandType::Request,
        cmd_code: CommandCode::Heartbeat,
        version: 1,
        request_id,
        codec: HEARTBEAT_CODEC,
        timeout: -1,
        class_name: Bytes::new(),
        header: Bytes::new(),
        content: Bytes::new(),
    }
}

/// A V1 heartbeat ack for probe `request_id`
pub fn heartbeat_ack(request_id: u32) -> ResponseCommand {
    ResponseCommand {
        frame: FrameVersion::V1,
        cmd_code: CommandCode::Heartbeat,
        version: 1,
        request_id,
        codec: HEARTBEAT_CODEC,
        status: ResponseStatus::SUCCESS,
        class_name: Bytes::new(),
        header: Bytes::new(),
        content: Bytes::new(),
    }
}
