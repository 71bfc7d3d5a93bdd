// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! roster-remote: WebSocket store server for the roster user directory.
//!
//! This server owns the canonical user collection. Clients create and
//! delete users by request and subscribe to live, newest-first snapshots.

mod server;
mod state;
mod store;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// roster-remote: user directory store server
#[derive(Parser, Debug)]
#[command(name = "roster-remote")]
#[command(about = "WebSocket store server for the roster user directory")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Directory for database storage
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db_path = args.data.join("users.db");
    info!("Starting roster-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Database: {}", db_path.display());

    let state = state::ServerState::open(&db_path)?;
    info!("  Users: {}", state.count().await?);

    server::run(args.bind, state).await?;

    Ok(())
}
