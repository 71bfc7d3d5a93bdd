// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{QueueError, RemoteError, SeedError};

/// All possible errors that can occur in the roster CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("{0}")]
    InvalidUrl(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Record(#[from] roster_core::Error),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error("remote store at {url} is unreachable\n  hint: start roster-remote or set [remote] url in the config")]
    NotConnected { url: String },

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("failed to delete {id}: {message}")]
    DeleteFailed { id: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
