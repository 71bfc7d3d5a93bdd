// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! roster - offline-aware client for a shared users directory.
//!
//! This crate provides the library behind the `roster` CLI: a sync layer
//! that reconciles a remote record store with local writes made under
//! intermittent connectivity.
//!
//! # Main Components
//!
//! - [`sync::SyncController`] - add/delete/flush handlers over shared session state
//! - [`sync::ActionQueue`] - adds made offline, replayed in order on reconnect
//! - [`sync::Session`] - subscription and connectivity watchers for one login
//! - [`sync::WsRemoteStore`] - WebSocket client for `roster-remote`
//! - [`Config`] - client configuration
//! - [`Error`] - Error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use roster::sync::{ActionQueue, ManualConnectivity, Session, SyncController, WsConfig, WsRemoteStore};
//!
//! let remote = WsRemoteStore::new(WsConfig::new("ws://127.0.0.1:7890"));
//! let controller = Arc::new(SyncController::new(remote, ActionQueue::in_memory()));
//! let network = ManualConnectivity::new(true);
//! let session = Session::start(Arc::clone(&controller), &network, Default::default());
//!
//! controller.submit_add(RecordInput::new("Ann", "ann@example.com")).await;
//! network.set(false);
//! // ...
//! session.logout().await;
//! ```

mod cli;
mod commands;
mod display;
mod env;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    if let Command::Completion { shell } = cli.command {
        commands::completion::run(shell);
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Add { name, email, phone } => {
            commands::add::run(&config, name, email, phone).await
        }
        Command::Delete { id } => commands::delete::run(&config, &id).await,
        Command::List { query, output } => {
            commands::list::run(&config, query.as_deref(), output).await
        }
        Command::Queue { output } => commands::queue::run(&config, output),
        Command::Flush => commands::flush::run(&config).await,
        Command::Watch => commands::watch::run(&config).await,
        Command::Completion { .. } => Ok(()),
    }
}

/// Default log filter for the CLI: `debug` with `--verbose`, else `warn`.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "roster=debug,roster_core=debug"
    } else {
        "warn"
    }
}

/// Whether `RUST_LOG` should take precedence over the default filter.
pub fn log_filter_from_env() -> bool {
    env::log_filter_set()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
