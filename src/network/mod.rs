//! Network Module
//!
//! TCP plumbing around the codecs.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One thread per connection, each owning its read buffer
//! - Frames dispatched through the shared, read-only `Registry`
//! - Non-heartbeat commands handed to a `Router`

mod router;
mod connection;
mod server;
mod client;

pub use router::{ChannelRouter, NoRouteRouter, RoutedCommand};
pub use connection::{decode_next, process_buffer, Connection};
pub use server::{Server, ShutdownHandle};
pub use client::BoltClient;
