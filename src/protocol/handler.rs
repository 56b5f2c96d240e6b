//! Command Handler
//!
//! Decides, per decoded command, whether it is answered inside the codec
//! layer or handed to the routing layer.

use crate::error::Result;
use super::{Command, CommandCode, CommandType, ResponseCommand, ResponseStatus};

/// The routing layer that receives every command not answered locally
pub trait Router: Send + Sync {
    /// Route `command`; `Some` is a reply to write back on the connection
    fn route(&self, command: Command) -> Result<Option<Command>>;
}

/// Dispatches decoded commands
pub trait CommandHandler: Send + Sync {
    /// Handle one command; `Some` is a reply to encode and write back
    fn handle(&self, command: Command, router: &dyn Router) -> Result<Option<Command>>;
}

/// Handler shared by Bolt V1 and V2
///
/// Heartbeat requests are acked in place with the probe's frame layout,
/// version and request id. Everything else goes to the router untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoltCommandHandler;

impl BoltCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

impl CommandHandler for BoltCommandHandler {
    fn handle(&self, command: Command, router: &dyn Router) -> Result<Option<Command>> {
        match command {
            Command::Request(req) if req.cmd_code == CommandCode::Heartbeat => {
                tracing::trace!("Heartbeat {} received", req.request_id);
                match req.cmd_type {
                    CommandType::RequestOneway => Ok(None),
                    _ => Ok(Some(
                        ResponseCommand::for_request(&req, ResponseStatus::SUCCESS).into(),
                    )),
                }
            }
            other => router.route(other),
        }
    }
}
