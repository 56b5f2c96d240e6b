//! Blocking Bolt client
//!
//! Used by the CLI and by tests to talk to a server.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;

use crate::error::{BoltError, Result};
use crate::protocol::{heartbeat, Command, CommandCode, FrameVersion, Registry, ResponseCommand};
use super::decode_next;

pub struct BoltClient {
    stream: TcpStream,
    registry: Arc<Registry>,
    buffer: BytesMut,
    next_id: u32,
}

impl BoltClient {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs, registry: Arc<Registry>) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            registry,
            buffer: BytesMut::new(),
            next_id: 1,
        })
    }

    /// Bound every blocking read
    pub fn set_timeout(&self, timeout: Duration) -> Result<()> {
        self.stream.set_read_timeout(Some(timeout))?;
        self.stream.set_write_timeout(Some(timeout))?;
        Ok(())
    }

    /// A fresh request id
    pub fn next_request_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Encode and write one command
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let protocol = self.registry.lookup(command.protocol_code())?;
        let bytes = protocol.encoder().encode(command)?;
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Read until one full frame is decoded
    pub fn recv(&mut self) -> Result<Command> {
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(command) = decode_next(&mut self.buffer, &self.registry)? {
                return Ok(command);
            }
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(BoltError::Network("connection closed by server".to_string()));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    /// Send a command and wait for the next frame
    pub fn call(&mut self, command: &Command) -> Result<Command> {
        self.send(command)?;
        self.recv()
    }

    /// Probe the server with a heartbeat in the given frame layout
    pub fn heartbeat(&mut self, frame: FrameVersion) -> Result<ResponseCommand> {
        let mut probe = heartbeat(self.next_request_id());
        probe.frame = frame;
        let id = probe.request_id;

        match self.call(&probe.into())? {
            Command::Response(ack)
                if ack.request_id == id && ack.cmd_code == CommandCode::Heartbeat =>
            {
                Ok(ack)
            }
            other => Err(BoltError::Network(format!(
                "unexpected reply to heartbeat {}: {:?}",
                id,
                other.shape()
            ))),
        }
    }
}
