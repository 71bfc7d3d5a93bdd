// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session state shared by the controller and its watchers.

use roster_core::{QueuedAction, Record};
use serde::Serialize;

use super::connectivity::Connectivity;
use super::projection::LocalProjection;
use super::queue::ActionQueue;

/// Lifecycle of the subscription watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    #[default]
    Idle,
    Watching,
}

/// Mutable state of one session.
///
/// `custom_records` changes only when a subscription snapshot arrives or a
/// delete succeeds. `pending_queue` changes on enqueue and after a flush.
#[derive(Debug, Default)]
pub struct SyncState {
    pub seed_records: Vec<Record>,
    pub custom_records: Vec<Record>,
    pub pending_queue: ActionQueue,
    pub connectivity: Connectivity,
    pub loading: bool,
    pub last_error: Option<String>,
    pub watcher: WatcherState,
}

impl SyncState {
    /// Fresh state with empty collections around the given queue.
    pub fn new(pending_queue: ActionQueue) -> Self {
        SyncState {
            pending_queue,
            ..SyncState::default()
        }
    }

    /// Advisory reading used to pick the online or offline path.
    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    /// Owned copy for presentation layers.
    pub fn view(&self) -> SyncView {
        SyncView {
            seed_records: self.seed_records.clone(),
            custom_records: self.custom_records.clone(),
            pending_queue: self.pending_queue.snapshot(),
            is_connected: self.is_connected(),
            connectivity: self.connectivity,
            loading: self.loading,
            last_error: self.last_error.clone(),
            watcher: self.watcher,
        }
    }
}

/// Point-in-time copy of [`SyncState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncView {
    pub seed_records: Vec<Record>,
    pub custom_records: Vec<Record>,
    pub pending_queue: Vec<QueuedAction>,
    pub is_connected: bool,
    pub connectivity: Connectivity,
    pub loading: bool,
    pub last_error: Option<String>,
    pub watcher: WatcherState,
}

impl SyncView {
    /// Merged view of custom and seed records.
    pub fn projection(&self) -> LocalProjection<'_> {
        LocalProjection::new(&self.seed_records, &self.custom_records)
    }
}
