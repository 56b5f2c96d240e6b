//! Bolt CLI Client
//!
//! Command-line probe for Bolt servers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use boltwire::protocol::{FrameVersion, SWITCH_CRC};
use boltwire::{Config, Registry};
use tracing_subscriber::{fmt, EnvFilter};

/// Bolt CLI
#[derive(Parser, Debug)]
#[command(name = "bolt-cli")]
#[command(about = "CLI for probing Bolt servers")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:12200")]
    server: String,

    /// Reply timeout in milliseconds
    #[arg(short, long, default_value = "3000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send heartbeat probes and wait for the acks
    Heartbeat {
        /// Number of probes to send
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Use the V2 frame layout
        #[arg(long)]
        v2: bool,

        /// Append a CRC32 trailer (V2 only)
        #[arg(long, requires = "v2")]
        crc: bool,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let registry = match Registry::with_bolt(&Config::default()) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let mut client = match boltwire::network::BoltClient::connect(&args.server, registry) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: cannot connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = client.set_timeout(Duration::from_millis(args.timeout_ms)) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    match args.command {
        Commands::Heartbeat { count, v2, crc } => {
            let frame = if v2 {
                FrameVersion::V2 {
                    protocol_version: if crc { 2 } else { 1 },
                    switch: if crc { SWITCH_CRC } else { 0 },
                }
            } else {
                FrameVersion::V1
            };

            for _ in 0..count {
                let started = Instant::now();
                match client.heartbeat(frame) {
                    Ok(ack) => println!(
                        "ack id={} status={} time={:?}",
                        ack.request_id,
                        ack.status.0,
                        started.elapsed()
                    ),
                    Err(e) => {
                        eprintln!("error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
    }
}
