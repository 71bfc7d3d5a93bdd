// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Temp state dir plus a config pointing at an address nothing listens on.
pub struct Offline {
    pub temp: TempDir,
    pub config: PathBuf,
}

impl Offline {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = temp.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "state_dir = {:?}\n\n[remote]\nurl = \"ws://127.0.0.1:{}\"\nrequest_timeout_ms = 500\n\n[connectivity]\nprobe_timeout_ms = 200\n",
                temp.path().join("state"),
                port
            ),
        )
        .unwrap();
        Offline { temp, config }
    }

    pub fn roster(&self) -> Command {
        let mut cmd = roster();
        cmd.env("ROSTER_CONFIG", &self.config)
            .env_remove("ROSTER_STATE_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn queue_file(&self) -> PathBuf {
        self.temp.path().join("state").join("queue.jsonl")
    }
}

pub fn roster() -> Command {
    cargo_bin_cmd!("roster")
}
