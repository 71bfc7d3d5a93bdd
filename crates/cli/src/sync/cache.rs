// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk copy of the last subscription snapshot.
//!
//! Lets a fresh process show the last known custom records before the live
//! subscription delivers, or when the store is unreachable.

use std::path::{Path, PathBuf};

use roster_core::{jsonl, Record};

/// Last snapshot stored as JSONL, newest first.
#[derive(Debug, Clone)]
pub struct RecordCache {
    path: PathBuf,
}

impl RecordCache {
    pub fn new(path: &Path) -> Self {
        RecordCache {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached records; empty if nothing was stored yet.
    pub fn load(&self) -> roster_core::Result<Vec<Record>> {
        jsonl::read_all(&self.path)
    }

    /// Replace the cached records.
    pub fn store(&self, records: &[Record]) -> roster_core::Result<()> {
        jsonl::write_all(&self.path, records)
    }
}
