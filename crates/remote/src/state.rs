// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the canonical user store for shared access and fans every change
//! out to subscribers as a full snapshot.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use roster_core::protocol::ServerMessage;
use roster_core::{Record, RecordInput};

use crate::store::{StoreResult, UserStore};

/// Shared server state containing the canonical user store.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    store: Mutex<UserStore>,
    /// Snapshots published after each change.
    broadcast_tx: broadcast::Sender<ServerMessage>,
}

impl ServerState {
    /// Opens the store at the given database path.
    pub fn open(db_path: &Path) -> StoreResult<Self> {
        Ok(Self::with_store(UserStore::open(db_path)?))
    }

    pub fn with_store(store: UserStore) -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        ServerState {
            inner: Arc::new(ServerStateInner {
                store: Mutex::new(store),
                broadcast_tx,
            }),
        }
    }

    /// Inserts a user and publishes the new collection.
    pub async fn create(&self, input: RecordInput) -> StoreResult<Record> {
        let store = self.inner.store.lock().await;
        let record = store.insert(input)?;
        self.publish(&store)?;
        Ok(record)
    }

    /// Deletes a user and publishes the new collection.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let store = self.inner.store.lock().await;
        store.delete(id)?;
        self.publish(&store)
    }

    /// Current collection, newest first.
    pub async fn snapshot(&self) -> StoreResult<Vec<Record>> {
        self.inner.store.lock().await.list()
    }

    /// Current collection plus a receiver for every later change.
    ///
    /// Both are taken under the store lock, so the receiver never yields a
    /// snapshot older than the one returned.
    pub async fn watch(&self) -> StoreResult<(Vec<Record>, broadcast::Receiver<ServerMessage>)> {
        let store = self.inner.store.lock().await;
        let rx = self.inner.broadcast_tx.subscribe();
        Ok((store.list()?, rx))
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.inner.store.lock().await.count()
    }

    // Runs under the store lock so snapshots go out in commit order.
    fn publish(&self, store: &UserStore) -> StoreResult<()> {
        let records = store.list()?;
        debug!(count = records.len(), "publishing snapshot");
        let _ = self.inner.broadcast_tx.send(ServerMessage::snapshot(records));
        Ok(())
    }
}
