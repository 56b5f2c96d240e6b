//! V1 Codec Tests
//!
//! Tests for V1 request/response encoding and decoding.

use bytes::Bytes;
use boltwire::BoltError;
use boltwire::protocol::{
    heartbeat, heartbeat_ack, BoltV1Codec, Command, CommandCode, CommandType, Decoded,
    Decoder, Encoder, FrameVersion, RequestCommand, ResponseCommand, ResponseStatus,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn decode_frame(codec: &BoltV1Codec, bytes: &[u8]) -> (Command, usize) {
    match codec.decode(bytes).unwrap() {
        Decoded::Frame { command, consumed } => (command, consumed),
        Decoded::Incomplete => panic!("Expected a full frame"),
    }
}

fn rpc_request() -> RequestCommand {
    RequestCommand {
        frame: FrameVersion::V1,
        cmd_type: CommandType::Request,
        cmd_code: CommandCode::RpcRequest,
        version: 1,
        request_id: 0xDEAD_BEEF,
        codec: 1,
        timeout: 3000,
        class_name: Bytes::from_static(b"com.example.EchoRequest"),
        header: Bytes::from_static(b"\x00\x03key\x00\x05value"),
        content: Bytes::from(vec![0xAB; 300]),
    }
}

/// V1 heartbeat request, id 42, no timeout, empty spans
const HEARTBEAT_42: [u8; 22] = [
    0x01, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x2A, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// V1 heartbeat ack, id 42, status SUCCESS
const HEARTBEAT_ACK_42: [u8; 20] = [
    0x01, 0x01, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00,
];

// =============================================================================
// Wire Layout Tests
// =============================================================================

#[test]
fn test_decode_raw_heartbeat_request() {
    let codec = BoltV1Codec::default();
    let (command, consumed) = decode_frame(&codec, &HEARTBEAT_42);

    assert_eq!(consumed, 22);
    match command {
        Command::Request(req) => {
            assert_eq!(req.cmd_type, CommandType::Request);
            assert_eq!(req.cmd_code, CommandCode::Heartbeat);
            assert_eq!(req.request_id, 42);
            assert_eq!(req.timeout, -1);
            assert_eq!(req.version, 1);
            assert!(req.class_name.is_empty());
            assert!(req.header.is_empty());
            assert!(req.content.is_empty());
        }
        _ => panic!("Expected a request"),
    }
}

#[test]
fn test_encode_heartbeat_matches_raw_bytes() {
    let codec = BoltV1Codec::default();
    let encoded = codec.encode(&heartbeat(42).into()).unwrap();
    assert_eq!(&encoded[..], &HEARTBEAT_42[..]);
}

#[test]
fn test_encode_heartbeat_ack_layout() {
    let codec = BoltV1Codec::default();
    let encoded = codec.encode(&heartbeat_ack(42).into()).unwrap();
    assert_eq!(encoded.len(), 20);
    assert_eq!(&encoded[..], &HEARTBEAT_ACK_42[..]);
}

#[test]
fn test_request_field_offsets() {
    let codec = BoltV1Codec::default();
    let req = rpc_request();
    let encoded = codec.encode(&req.clone().into()).unwrap();

    assert_eq!(encoded[0], 0x01);
    assert_eq!(encoded[1], CommandType::Request as u8);
    assert_eq!(&encoded[2..4], &[0x00, 0x02]);
    assert_eq!(encoded[4], 1);
    assert_eq!(&encoded[5..9], &0xDEAD_BEEFu32.to_be_bytes());
    assert_eq!(encoded[9], 1);
    assert_eq!(&encoded[10..14], &3000i32.to_be_bytes());
    assert_eq!(&encoded[14..16], &(req.class_name.len() as u16).to_be_bytes());
    assert_eq!(&encoded[16..18], &(req.header.len() as u16).to_be_bytes());
    assert_eq!(&encoded[18..22], &(req.content.len() as u32).to_be_bytes());
    assert_eq!(&encoded[22..22 + req.class_name.len()], &req.class_name[..]);
    assert_eq!(
        encoded.len(),
        22 + req.class_name.len() + req.header.len() + req.content.len()
    );
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_encode_decode_request() {
    let codec = BoltV1Codec::default();
    let original: Command = rpc_request().into();
    let encoded = codec.encode(&original).unwrap();
    let (decoded, consumed) = decode_frame(&codec, &encoded);

    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, original);
}

#[test]
fn test_encode_decode_oneway_request() {
    let codec = BoltV1Codec::default();
    let mut req = rpc_request();
    req.cmd_type = CommandType::RequestOneway;
    let original: Command = req.into();

    let encoded = codec.encode(&original).unwrap();
    let (decoded, _) = decode_frame(&codec, &encoded);

    assert_eq!(decoded.command_type(), CommandType::RequestOneway);
    assert_eq!(decoded, original);
}

#[test]
fn test_encode_decode_response() {
    let codec = BoltV1Codec::default();
    let original: Command = ResponseCommand {
        frame: FrameVersion::V1,
        cmd_code: CommandCode::RpcResponse,
        version: 1,
        request_id: 9,
        codec: 1,
        status: ResponseStatus::SERVER_DESERIAL_EXCEPTION,
        class_name: Bytes::from_static(b"com.example.EchoResponse"),
        header: Bytes::new(),
        content: Bytes::from_static(b"payload"),
    }
    .into();

    let encoded = codec.encode(&original).unwrap();
    let (decoded, consumed) = decode_frame(&codec, &encoded);

    assert_eq!(consumed, 20 + 24 + 7);
    assert_eq!(decoded, original);
}

#[test]
fn test_unknown_status_passes_through() {
    let codec = BoltV1Codec::default();
    let mut resp = heartbeat_ack(1);
    resp.status = ResponseStatus(0x7F00);
    let encoded = codec.encode(&resp.clone().into()).unwrap();
    let (decoded, _) = decode_frame(&codec, &encoded);

    assert_eq!(decoded, Command::Response(resp));
}

// =============================================================================
// Decode Error Handling Tests
// =============================================================================

#[test]
fn test_unknown_command_type() {
    let codec = BoltV1Codec::default();
    let mut bytes = HEARTBEAT_42;
    bytes[1] = 0x09;

    let result = codec.decode(&bytes);
    assert!(matches!(result, Err(BoltError::Malformed(_))));
    assert!(result.unwrap_err().to_string().contains("Unknown command type"));
}

#[test]
fn test_unknown_command_code() {
    let codec = BoltV1Codec::default();
    let mut bytes = HEARTBEAT_42;
    bytes[2] = 0x7F;

    let result = codec.decode(&bytes);
    assert!(matches!(result, Err(BoltError::Malformed(_))));
    assert!(result.unwrap_err().to_string().contains("Unknown command code"));
}

#[test]
fn test_foreign_protocol_code_rejected() {
    let codec = BoltV1Codec::default();
    let mut bytes = HEARTBEAT_42;
    bytes[0] = 0x02;

    assert!(matches!(codec.decode(&bytes), Err(BoltError::Malformed(_))));
}

#[test]
fn test_declared_length_over_limit() {
    let codec = BoltV1Codec::new(1024);
    let mut bytes = HEARTBEAT_42.to_vec();
    bytes[18..22].copy_from_slice(&2048u32.to_be_bytes());

    let result = codec.decode(&bytes);
    assert!(matches!(result, Err(BoltError::Malformed(_))));
    assert!(result.unwrap_err().to_string().contains("Frame too large"));
}

#[test]
fn test_declared_length_under_limit_waits() {
    let codec = BoltV1Codec::new(4096);
    let mut bytes = HEARTBEAT_42.to_vec();
    bytes[18..22].copy_from_slice(&2048u32.to_be_bytes());

    assert_eq!(codec.decode(&bytes).unwrap(), Decoded::Incomplete);
}

#[test]
fn test_empty_and_short_buffers_are_incomplete() {
    let codec = BoltV1Codec::default();
    assert_eq!(codec.decode(&[]).unwrap(), Decoded::Incomplete);
    assert_eq!(codec.decode(&HEARTBEAT_42[..1]).unwrap(), Decoded::Incomplete);
    assert_eq!(codec.decode(&HEARTBEAT_42[..21]).unwrap(), Decoded::Incomplete);
    // A response header is shorter, so 20 bytes of a request are still short
    assert_eq!(codec.decode(&HEARTBEAT_42[..20]).unwrap(), Decoded::Incomplete);
}

// =============================================================================
// Encode Error Handling Tests
// =============================================================================

#[test]
fn test_encode_v2_command_rejected() {
    let codec = BoltV1Codec::default();
    let mut req = heartbeat(1);
    req.frame = FrameVersion::V2 {
        protocol_version: 1,
        switch: 0,
    };

    let result = codec.encode(&req.into());
    assert!(matches!(result, Err(BoltError::WrongCommandShape(_))));
}

#[test]
fn test_encode_request_with_response_type_rejected() {
    let codec = BoltV1Codec::default();
    let mut req = heartbeat(1);
    req.cmd_type = CommandType::Response;

    let result = codec.encode(&req.into());
    assert!(matches!(result, Err(BoltError::WrongCommandShape(_))));
}

#[test]
fn test_encode_class_name_overflow() {
    let codec = BoltV1Codec::default();
    let mut req = rpc_request();
    req.class_name = Bytes::from(vec![b'a'; 65536]);

    match codec.encode(&req.into()) {
        Err(BoltError::FieldOverflow { field, len, max }) => {
            assert_eq!(field, "classLen");
            assert_eq!(len, 65536);
            assert_eq!(max, 65535);
        }
        other => panic!("Expected FieldOverflow, got {:?}", other),
    }
}

#[test]
fn test_encode_header_at_width_limit() {
    let codec = BoltV1Codec::default();
    let mut req = rpc_request();
    req.header = Bytes::from(vec![0u8; 65535]);
    let original: Command = req.into();

    let encoded = codec.encode(&original).unwrap();
    let (decoded, _) = decode_frame(&codec, &encoded);
    assert_eq!(decoded, original);
}
