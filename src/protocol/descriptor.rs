//! Protocol descriptor
//!
//! Binds a discriminator byte to the codec pair and command handler for one
//! wire version. Built once at startup and shared read-only afterwards.

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use super::handler::{BoltCommandHandler, CommandHandler};
use super::v1::BoltV1Codec;
use super::v2::BoltV2Codec;
use super::{
    Decoder, Encoder, PROTOCOL_CODE_V1, PROTOCOL_CODE_V2, REQUEST_HEADER_LEN_V1,
    REQUEST_HEADER_LEN_V2, RESPONSE_HEADER_LEN_V1, RESPONSE_HEADER_LEN_V2,
};

/// Everything a connection needs to speak one wire version
pub struct Protocol {
    code: u8,
    request_header_len: usize,
    response_header_len: usize,
    encoder: Arc<dyn Encoder>,
    decoder: Arc<dyn Decoder>,
    handler: Arc<dyn CommandHandler>,
}

impl Protocol {
    pub fn new(
        code: u8,
        request_header_len: usize,
        response_header_len: usize,
        encoder: Arc<dyn Encoder>,
        decoder: Arc<dyn Decoder>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            code,
            request_header_len,
            response_header_len,
            encoder,
            decoder,
            handler,
        }
    }

    /// Bolt V1 with the given configuration
    pub fn bolt_v1(config: &Config) -> Self {
        let codec = Arc::new(BoltV1Codec::from_config(config));
        Self::new(
            PROTOCOL_CODE_V1,
            REQUEST_HEADER_LEN_V1,
            RESPONSE_HEADER_LEN_V1,
            codec.clone(),
            codec,
            Arc::new(BoltCommandHandler::new()),
        )
    }

    /// Bolt V2 with the given configuration
    pub fn bolt_v2(config: &Config) -> Self {
        let codec = Arc::new(BoltV2Codec::from_config(config));
        Self::new(
            PROTOCOL_CODE_V2,
            REQUEST_HEADER_LEN_V2,
            RESPONSE_HEADER_LEN_V2,
            codec.clone(),
            codec,
            Arc::new(BoltCommandHandler::new()),
        )
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn request_header_length(&self) -> usize {
        self.request_header_len
    }

    pub fn response_header_length(&self) -> usize {
        self.response_header_len
    }

    pub fn encoder(&self) -> &dyn Encoder {
        self.encoder.as_ref()
    }

    pub fn decoder(&self) -> &dyn Decoder {
        self.decoder.as_ref()
    }

    pub fn command_handler(&self) -> &dyn CommandHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protocol")
            .field("code", &self.code)
            .field("request_header_len", &self.request_header_len)
            .field("response_header_len", &self.response_header_len)
            .finish_non_exhaustive()
    }
}
