// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-aware client for a shared users directory")]
#[command(
    long_about = "Offline-aware client for a shared users directory.\n\n\
    Adds made while the remote store is unreachable are queued locally and \
    replayed once it is reachable again."
)]
pub struct Cli {
    /// Path to the config file (default: $ROSTER_CONFIG or <config_dir>/roster/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a record, queueing it if the remote store is unreachable
    #[command(after_help = "\
Examples:
  roster add \"Ann Lee\" ann@example.com
  roster add \"Ann Lee\" ann@example.com --phone 555-0100")]
    Add {
        /// Display name
        #[arg(value_parser = non_empty_string)]
        name: String,

        /// Email address
        #[arg(value_parser = non_empty_string)]
        email: String,

        /// Phone number
        #[arg(long, short, default_value = "")]
        phone: String,
    },

    /// Delete a record from the remote store
    Delete {
        /// Record ID
        #[arg(value_parser = non_empty_string)]
        id: String,
    },

    /// List records: custom records first, then seed records
    List {
        /// Filter by name, email or phone
        query: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show actions waiting for the remote store
    Queue {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Replay queued actions now
    Flush,

    /// Stay connected and print sync activity until interrupted
    Watch,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
