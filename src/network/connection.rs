//! Connection Handler
//!
//! Drives one client connection: accumulate bytes, decode every complete
//! frame, dispatch, write replies.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};

use crate::error::{BoltError, Result};
use crate::protocol::{Command, Decoded, Registry, Router};

/// Bytes requested from the socket per read
const READ_CHUNK: usize = 8 * 1024;

/// Decode the next complete frame at the front of `buffer`
///
/// The protocol is picked by the first buffered byte. Consumed bytes are
/// removed from the buffer; on `None` nothing is consumed.
pub fn decode_next(buffer: &mut BytesMut, registry: &Registry) -> Result<Option<Command>> {
    let Some(&code) = buffer.first() else {
        return Ok(None);
    };
    let protocol = registry.lookup(code)?;

    match protocol.decoder().decode(&buffer[..])? {
        Decoded::Incomplete => Ok(None),
        Decoded::Frame { command, consumed } => {
            buffer.advance(consumed);
            Ok(Some(command))
        }
    }
}

/// Decode and dispatch every complete frame in `buffer`
///
/// Encoded replies are appended to `out`. Returns the number of frames
/// handled. A partial trailing frame stays in `buffer`.
pub fn process_buffer(
    buffer: &mut BytesMut,
    out: &mut BytesMut,
    registry: &Registry,
    router: &dyn Router,
) -> Result<usize> {
    let mut handled = 0;
    while let Some(command) = decode_next(buffer, registry)? {
        handled += 1;
        let protocol = registry.lookup(command.protocol_code())?;
        let reply = protocol.command_handler().handle(command, router)?;

        if let Some(reply) = reply {
            // A router may answer in a different layout than it was asked in.
            let target = registry.lookup(reply.protocol_code())?;
            target.encoder().encode_to(&reply, out)?;
        }
    }
    Ok(handled)
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream
    stream: TcpStream,

    /// Bytes received but not yet decoded
    buffer: BytesMut,

    /// Shared protocol table
    registry: Arc<Registry>,

    /// Where non-heartbeat commands go
    router: Arc<dyn Router>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, registry: Arc<Registry>, router: Arc<dyn Router>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            registry,
            router,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 = none)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns `Ok` when the peer goes away and `Err` when the stream can no
    /// longer be interpreted (unknown protocol, malformed frame).
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut chunk = [0u8; READ_CHUNK];
        let mut out = BytesMut::new();

        loop {
            let n = match self.stream.read(&mut chunk) {
                Ok(0) => {
                    if !self.buffer.is_empty() {
                        tracing::debug!(
                            "Client {} closed mid-frame, discarding {} bytes",
                            self.peer_addr,
                            self.buffer.len()
                        );
                    } else {
                        tracing::debug!("Client {} disconnected", self.peer_addr);
                    }
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(ref e)
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                    ) =>
                {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    // Read timeout (Windows uses TimedOut instead of WouldBlock)
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            self.buffer.extend_from_slice(&chunk[..n]);

            let handled = match process_buffer(
                &mut self.buffer,
                &mut out,
                &self.registry,
                self.router.as_ref(),
            ) {
                Ok(handled) => handled,
                Err(e) => {
                    tracing::warn!("Closing connection from {}: {}", self.peer_addr, e);
                    // Replies for frames decoded before the bad one still go out.
                    let _ = self.flush(&mut out);
                    return Err(e);
                }
            };
            tracing::trace!("Handled {} frames from {}", handled, self.peer_addr);

            if let Err(e) = self.flush(&mut out) {
                if let BoltError::Io(ref io_err) = e {
                    if matches!(
                        io_err.kind(),
                        ErrorKind::ConnectionAborted
                            | ErrorKind::ConnectionReset
                            | ErrorKind::BrokenPipe
                    ) {
                        tracing::debug!(
                            "Client {} disconnected before replies could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    fn flush(&mut self, out: &mut BytesMut) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        self.stream.write_all(&out[..])?;
        self.stream.flush()?;
        out.clear();
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
