//! TCP Server
//!
//! Accepts connections and gives each its own worker thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{BoltError, Result};
use crate::protocol::{Registry, Router};
use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// TCP server speaking every protocol in its registry
pub struct Server {
    config: Config,
    registry: Arc<Registry>,
    router: Arc<dyn Router>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server; the registry must already be populated
    pub fn new(config: Config, registry: Arc<Registry>, router: Arc<dyn Router>) -> Self {
        Self {
            config,
            registry,
            router,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listen address; returns the bound address
    pub fn bind(&mut self) -> Result<SocketAddr> {
        self.config.validate()?;
        if self.registry.is_empty() {
            return Err(BoltError::Config("no protocols registered".to_string()));
        }

        let listener = TcpListener::bind(&self.config.listen_addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        tracing::info!("Listening on {} (protocols {:?})", addr, self.registry.codes());

        self.listener = Some(listener);
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| BoltError::Network("listener not bound".to_string()))?;

        while !self.shutdown.load(Ordering::Relaxed) {
            let (stream, addr) = match listener.accept() {
                Ok(accepted) => accepted,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if self.active.load(Ordering::Relaxed) >= self.config.max_connections {
                tracing::warn!("Rejecting {}: connection limit reached", addr);
                continue;
            }
            if let Err(e) = stream.set_nonblocking(false) {
                tracing::warn!("Failed to configure stream from {}: {}", addr, e);
                continue;
            }

            let mut connection =
                match Connection::new(stream, Arc::clone(&self.registry), Arc::clone(&self.router)) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!("Failed to set up connection from {}: {}", addr, e);
                        continue;
                    }
                };
            if let Err(e) =
                connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)
            {
                tracing::warn!("Failed to set timeouts for {}: {}", addr, e);
                continue;
            }

            let active = Arc::clone(&self.active);
            active.fetch_add(1, Ordering::Relaxed);
            let spawned = thread::Builder::new()
                .name(format!("bolt-conn-{}", addr))
                .spawn(move || {
                    if let Err(e) = connection.handle() {
                        tracing::debug!("Connection {} ended: {}", connection.peer_addr(), e);
                    }
                    active.fetch_sub(1, Ordering::Relaxed);
                });
            if let Err(e) = spawned {
                self.active.fetch_sub(1, Ordering::Relaxed);
                tracing::error!("Failed to spawn worker for {}: {}", addr, e);
            }
        }

        tracing::info!("Server shutting down");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
