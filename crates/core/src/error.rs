// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for roster-core operations.

use thiserror::Error;

/// All possible errors that can occur in roster-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt entry at line {line}: {source}")]
    CorruptLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A specialized Result type for roster-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
