//! Routing collaborators
//!
//! `NoRouteRouter` answers everything itself; `ChannelRouter` bridges each
//! connection thread to an external routing thread over a crossbeam channel.

use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::error::Result;
use crate::protocol::{Command, RequestCommand, ResponseCommand, ResponseStatus, Router};

/// Router for listeners with no upstream: every two-way request fails with
/// NO_PROCESSOR, responses and oneway requests are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRouteRouter;

impl Router for NoRouteRouter {
    fn route(&self, command: Command) -> Result<Option<Command>> {
        match command {
            Command::Request(req) if !req.is_oneway() => {
                tracing::debug!("No processor for request {}", req.request_id);
                Ok(Some(
                    ResponseCommand::for_request(&req, ResponseStatus::NO_PROCESSOR).into(),
                ))
            }
            other => {
                tracing::debug!("Dropping unroutable command {}", other.request_id());
                Ok(None)
            }
        }
    }
}

/// A command in flight to the routing thread
#[derive(Debug)]
pub struct RoutedCommand {
    pub command: Command,
    reply: Option<Sender<Command>>,
}

impl RoutedCommand {
    /// Whether the sender is waiting for an answer
    pub fn expects_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// Answer the command; false if nobody is waiting any more
    pub fn reply(self, response: Command) -> bool {
        match self.reply {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }
}

/// Hands commands to a routing thread and waits for two-way replies
#[derive(Debug, Clone)]
pub struct ChannelRouter {
    tx: Sender<RoutedCommand>,
    default_timeout: Duration,
}

impl ChannelRouter {
    /// Create a router and the receiving end for the routing thread
    ///
    /// `default_timeout` applies to requests whose own timeout is -1 or 0.
    pub fn new(default_timeout: Duration) -> (Self, Receiver<RoutedCommand>) {
        let (tx, rx) = channel::unbounded();
        (
            Self {
                tx,
                default_timeout,
            },
            rx,
        )
    }

    fn wait_for(&self, req: &RequestCommand) -> Duration {
        if req.timeout > 0 {
            Duration::from_millis(req.timeout as u64)
        } else {
            self.default_timeout
        }
    }
}

impl Router for ChannelRouter {
    fn route(&self, command: Command) -> Result<Option<Command>> {
        let pending = match &command {
            Command::Request(req) if !req.is_oneway() => Some(req.clone()),
            _ => None,
        };

        let Some(req) = pending else {
            if self.tx.send(RoutedCommand { command, reply: None }).is_err() {
                tracing::warn!("Routing layer is gone, dropping command");
            }
            return Ok(None);
        };

        let (reply_tx, reply_rx) = channel::bounded(1);
        let routed = RoutedCommand {
            command,
            reply: Some(reply_tx),
        };
        if self.tx.send(routed).is_err() {
            return Ok(Some(
                ResponseCommand::for_request(&req, ResponseStatus::CONNECTION_CLOSED).into(),
            ));
        }

        let status = match reply_rx.recv_timeout(self.wait_for(&req)) {
            Ok(response) => return Ok(Some(response)),
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!("Request {} timed out in routing", req.request_id);
                ResponseStatus::TIMEOUT
            }
            Err(RecvTimeoutError::Disconnected) => ResponseStatus::CONNECTION_CLOSED,
        };
        Ok(Some(ResponseCommand::for_request(&req, status).into()))
    }
}
