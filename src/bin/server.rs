//! Bolt Server Binary
//!
//! Listens for Bolt V1/V2 traffic, answers heartbeats and rejects every
//! other request with NO_PROCESSOR.

use std::sync::Arc;
use clap::Parser;
use boltwire::{Config, Registry};
use boltwire::network::{NoRouteRouter, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// Bolt Server
#[derive(Parser, Debug)]
#[command(name = "bolt-server")]
#[command(about = "Bolt wire protocol listener")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:12200")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Largest accepted frame in KB
    #[arg(short = 'f', long, default_value = "16384")]
    max_frame_kb: usize,

    /// Idle read timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "0")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,boltwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Bolt Server v{}", boltwire::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_frame_size(args.max_frame_kb * 1024)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Protocols are registered once, before the first accept
    let registry = match Registry::with_bolt(&config) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            tracing::error!("Failed to register protocols: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = Server::new(config, registry, Arc::new(NoRouteRouter));
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
