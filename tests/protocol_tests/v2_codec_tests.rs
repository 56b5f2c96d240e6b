//! V2 Codec Tests
//!
//! These tests verify:
//! - V2 field order (ver1 and switch bytes)
//! - CRC32 trailer presence rules
//! - CRC32 verification on decode

use bytes::Bytes;
use boltwire::BoltError;
use boltwire::protocol::{
    heartbeat, BoltV2Codec, Command, CommandCode, CommandType, Decoded, Decoder, Encoder,
    FrameVersion, RequestCommand, ResponseCommand, ResponseStatus, SWITCH_CRC,
};

// =============================================================================
// Helper Functions
// =============================================================================

const WITH_CRC: FrameVersion = FrameVersion::V2 {
    protocol_version: 2,
    switch: SWITCH_CRC,
};

const WITHOUT_CRC: FrameVersion = FrameVersion::V2 {
    protocol_version: 1,
    switch: 0,
};

fn decode_frame(codec: &BoltV2Codec, bytes: &[u8]) -> (Command, usize) {
    match codec.decode(bytes).unwrap() {
        Decoded::Frame { command, consumed } => (command, consumed),
        Decoded::Incomplete => panic!("Expected a full frame"),
    }
}

fn request(frame: FrameVersion) -> RequestCommand {
    RequestCommand {
        frame,
        cmd_type: CommandType::Request,
        cmd_code: CommandCode::RpcRequest,
        version: 1,
        request_id: 77,
        codec: 1,
        timeout: 1500,
        class_name: Bytes::from_static(b"com.example.Quote"),
        header: Bytes::from_static(b"\x00\x02id\x00\x01x"),
        content: Bytes::from_static(b"the quick brown fox"),
    }
}

fn response(frame: FrameVersion) -> ResponseCommand {
    ResponseCommand {
        frame,
        cmd_code: CommandCode::RpcResponse,
        version: 1,
        request_id: 77,
        codec: 1,
        status: ResponseStatus::SUCCESS,
        class_name: Bytes::from_static(b"com.example.QuoteResult"),
        header: Bytes::new(),
        content: Bytes::from_static(b"jumps over the lazy dog"),
    }
}

fn spans_len(req: &RequestCommand) -> usize {
    req.class_name.len() + req.header.len() + req.content.len()
}

// =============================================================================
// Wire Layout Tests
// =============================================================================

#[test]
fn test_request_field_offsets() {
    let codec = BoltV2Codec::default();
    let req = request(WITHOUT_CRC);
    let encoded = codec.encode(&req.clone().into()).unwrap();

    assert_eq!(encoded[0], 0x02);
    assert_eq!(encoded[1], 1); // ver1
    assert_eq!(encoded[2], CommandType::Request as u8);
    assert_eq!(&encoded[3..5], &[0x00, 0x02]);
    assert_eq!(encoded[5], 1); // ver2
    assert_eq!(&encoded[6..10], &77u32.to_be_bytes());
    assert_eq!(encoded[10], 1); // codec
    assert_eq!(encoded[11], 0); // switch
    assert_eq!(&encoded[12..16], &1500i32.to_be_bytes());
    assert_eq!(&encoded[16..18], &(req.class_name.len() as u16).to_be_bytes());
    assert_eq!(&encoded[18..20], &(req.header.len() as u16).to_be_bytes());
    assert_eq!(&encoded[20..24], &(req.content.len() as u32).to_be_bytes());
    assert_eq!(encoded.len(), 24 + spans_len(&req));
}

#[test]
fn test_response_field_offsets() {
    let codec = BoltV2Codec::default();
    let mut resp = response(WITHOUT_CRC);
    resp.status = ResponseStatus::TIMEOUT;
    let encoded = codec.encode(&resp.clone().into()).unwrap();

    assert_eq!(encoded[2], CommandType::Response as u8);
    assert_eq!(&encoded[12..14], &[0x00, 0x07]);
    assert_eq!(&encoded[14..16], &(resp.class_name.len() as u16).to_be_bytes());
    assert_eq!(&encoded[18..22], &(resp.content.len() as u32).to_be_bytes());
    assert_eq!(&encoded[22..22 + resp.class_name.len()], &resp.class_name[..]);
}

#[test]
fn test_crc_trailer_appended() {
    let codec = BoltV2Codec::default();
    let req = request(WITH_CRC);
    let encoded = codec.encode(&req.clone().into()).unwrap();

    let body_end = 24 + spans_len(&req);
    assert_eq!(encoded.len(), body_end + 4);
    let expected = crc32fast::hash(&encoded[..body_end]);
    assert_eq!(&encoded[body_end..], &expected.to_be_bytes());
}

#[test]
fn test_crc_needs_protocol_version_above_one() {
    let codec = BoltV2Codec::default();
    let req = request(FrameVersion::V2 {
        protocol_version: 1,
        switch: SWITCH_CRC,
    });
    let encoded = codec.encode(&req.clone().into()).unwrap();

    assert_eq!(encoded.len(), 24 + spans_len(&req));
}

#[test]
fn test_crc_needs_switch_bit() {
    let codec = BoltV2Codec::default();
    let req = request(FrameVersion::V2 {
        protocol_version: 2,
        switch: 0x02,
    });
    let encoded = codec.encode(&req.clone().into()).unwrap();

    assert_eq!(encoded.len(), 24 + spans_len(&req));
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_encode_decode_request_without_crc() {
    let codec = BoltV2Codec::default();
    let original: Command = request(WITHOUT_CRC).into();
    let encoded = codec.encode(&original).unwrap();
    let (decoded, consumed) = decode_frame(&codec, &encoded);

    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, original);
}

#[test]
fn test_encode_decode_request_with_crc() {
    let codec = BoltV2Codec::default();
    let original: Command = request(WITH_CRC).into();
    let encoded = codec.encode(&original).unwrap();
    let (decoded, consumed) = decode_frame(&codec, &encoded);

    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, original);
}

#[test]
fn test_encode_decode_response_with_crc() {
    let codec = BoltV2Codec::default();
    let original: Command = response(WITH_CRC).into();
    let encoded = codec.encode(&original).unwrap();
    let (decoded, consumed) = decode_frame(&codec, &encoded);

    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, original);
    assert_eq!(decoded.shape(), boltwire::protocol::FrameShape::V2Response);
}

#[test]
fn test_other_switch_bits_preserved() {
    let codec = BoltV2Codec::default();
    let original: Command = request(FrameVersion::V2 {
        protocol_version: 3,
        switch: SWITCH_CRC | 0x80,
    })
    .into();
    let encoded = codec.encode(&original).unwrap();
    let (decoded, _) = decode_frame(&codec, &encoded);

    assert_eq!(decoded, original);
}

// =============================================================================
// CRC Enforcement Tests
// =============================================================================

#[test]
fn test_flipped_payload_byte_fails_crc() {
    let codec = BoltV2Codec::default();
    let req = request(WITH_CRC);
    let encoded = codec.encode(&req.clone().into()).unwrap();

    let body_end = 24 + spans_len(&req);
    for i in 24..body_end {
        let mut corrupted = encoded.to_vec();
        corrupted[i] ^= 0x01;
        let result = codec.decode(&corrupted);
        assert!(
            matches!(result, Err(BoltError::Malformed(_))),
            "byte {} flipped but decode returned {:?}",
            i,
            result
        );
    }
}

#[test]
fn test_flipped_trailer_byte_fails_crc() {
    let codec = BoltV2Codec::default();
    let encoded = codec.encode(&response(WITH_CRC).into()).unwrap();

    let mut corrupted = encoded.to_vec();
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xFF;

    let result = codec.decode(&corrupted);
    assert!(result.unwrap_err().to_string().contains("CRC mismatch"));
}

#[test]
fn test_flipped_request_id_fails_crc() {
    let codec = BoltV2Codec::default();
    let encoded = codec.encode(&request(WITH_CRC).into()).unwrap();

    let mut corrupted = encoded.to_vec();
    corrupted[9] ^= 0x10;

    assert!(matches!(codec.decode(&corrupted), Err(BoltError::Malformed(_))));
}

#[test]
fn test_missing_trailer_is_incomplete() {
    let codec = BoltV2Codec::default();
    let encoded = codec.encode(&request(WITH_CRC).into()).unwrap();

    let truncated = &encoded[..encoded.len() - 4];
    assert_eq!(codec.decode(truncated).unwrap(), Decoded::Incomplete);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_unknown_command_type() {
    let codec = BoltV2Codec::default();
    let mut encoded = codec.encode(&request(WITHOUT_CRC).into()).unwrap().to_vec();
    encoded[2] = 0x05;

    assert!(matches!(codec.decode(&encoded), Err(BoltError::Malformed(_))));
}

#[test]
fn test_declared_length_over_limit() {
    let codec = BoltV2Codec::new(64);
    let encoded = codec.encode(&request(WITH_CRC).into()).unwrap();

    let result = codec.decode(&encoded[..24]);
    assert!(result.unwrap_err().to_string().contains("Frame too large"));
}

#[test]
fn test_v1_frame_rejected() {
    let codec = BoltV2Codec::default();
    let bytes = boltwire::protocol::BoltV1Codec::default()
        .encode(&heartbeat(1).into())
        .unwrap();

    assert!(matches!(codec.decode(&bytes), Err(BoltError::Malformed(_))));
}

#[test]
fn test_encode_v1_command_rejected() {
    let codec = BoltV2Codec::default();
    let result = codec.encode(&heartbeat(1).into());
    assert!(matches!(result, Err(BoltError::WrongCommandShape(_))));
}

#[test]
fn test_encode_header_overflow() {
    let codec = BoltV2Codec::default();
    let mut req = request(WITH_CRC);
    req.header = Bytes::from(vec![0u8; 70_000]);

    let result = codec.encode(&req.into());
    assert!(matches!(
        result,
        Err(BoltError::FieldOverflow { field: "headerLen", .. })
    ));
}
