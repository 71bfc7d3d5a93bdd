// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending mutation intents held in the offline queue.
//!
//! Each variant is one kind of mutation that can be replayed against the
//! remote store. The set is closed: adding a kind (for example queued
//! deletes) forces every replay site to handle it.

use serde::{Deserialize, Serialize};

use crate::record::RecordInput;

/// A mutation waiting to be delivered to the remote store.
///
/// Serialized as `{"kind": "ADD_RECORD", "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueuedAction {
    /// Create a record from user input.
    AddRecord(RecordInput),
}

impl QueuedAction {
    /// Creates an AddRecord action.
    pub fn add_record(input: RecordInput) -> Self {
        QueuedAction::AddRecord(input)
    }

    /// Short label for logs and listings.
    pub fn kind(&self) -> &'static str {
        match self {
            QueuedAction::AddRecord(_) => "ADD_RECORD",
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
