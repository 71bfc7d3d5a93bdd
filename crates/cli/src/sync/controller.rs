// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation between local intents and the remote store.
//!
//! Handlers run concurrently (a create can be in flight while a snapshot
//! arrives), so every read-modify-write of [`SyncState`] happens under one
//! async mutex that is never held across a remote call.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use roster_core::{QueuedAction, Record, RecordInput};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use super::cache::RecordCache;
use super::connectivity::Connectivity;
use super::queue::{ActionQueue, FlushGuard, QueueError, QueueResult};
use super::remote::{RemoteError, RemoteStore};
use super::seed::SeedSource;
use super::state::{SyncState, SyncView, WatcherState};
use super::transport::WsRemoteStore;

const SIGNAL_CAPACITY: usize = 256;

/// Notification for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSignal {
    /// An add was recorded: sent to the store, or queued when offline.
    AddAccepted { queued: bool },
    /// The store call for an add failed; the action was queued for retry.
    AddFailed { message: String },
    DeleteSucceeded { id: String },
    DeleteFailed { id: String, message: String },
    SeedLoaded { count: usize },
    SeedFailed { message: String },
    /// A subscription snapshot replaced the custom records.
    RecordsChanged { count: usize },
    ConnectivityChanged { connected: bool },
    /// A flush pass finished; `dropped` items failed and were discarded.
    Flushed { attempted: usize, dropped: usize },
}

/// Result of [`SyncController::submit_add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Store accepted the create. The record appears with the next snapshot.
    Sent,
    /// Offline: queued for the next reconnect.
    Queued,
    /// Store call failed: queued for the next reconnect, error recorded.
    Failed { message: String },
}

/// Result of [`SyncController::submit_delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed { message: String },
}

/// Result of [`SyncController::fetch_seed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Loaded { count: usize },
    Failed { message: String },
    /// A later fetch started before this one finished; its result was dropped.
    Superseded,
}

/// Summary of one flush pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    pub attempted: usize,
    pub dropped: usize,
}

/// Owns the session state and issues every remote call.
pub struct SyncController<R: RemoteStore = WsRemoteStore> {
    remote: R,
    seed: Option<Box<dyn SeedSource>>,
    cache: Option<RecordCache>,
    state: Mutex<SyncState>,
    signals: broadcast::Sender<SyncSignal>,
    /// Serializes flush passes.
    flush_lock: Mutex<()>,
    /// Bumped by every seed fetch; only the latest may write its result.
    seed_generation: AtomicU64,
}

impl<R: RemoteStore> SyncController<R> {
    /// Create a controller with empty collections around the given queue.
    pub fn new(remote: R, queue: ActionQueue) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        SyncController {
            remote,
            seed: None,
            cache: None,
            state: Mutex::new(SyncState::new(queue)),
            signals,
            flush_lock: Mutex::new(()),
            seed_generation: AtomicU64::new(0),
        }
    }

    /// Attach the one-shot seed source.
    pub fn with_seed(mut self, seed: impl SeedSource + 'static) -> Self {
        self.seed = Some(Box::new(seed));
        self
    }

    /// Persist snapshots to `cache` and start from its last contents.
    pub fn with_cache(mut self, cache: RecordCache) -> Self {
        match cache.load() {
            Ok(records) => self.state.get_mut().custom_records = records,
            Err(e) => warn!(path = %cache.path().display(), error = %e, "ignoring unreadable record cache"),
        }
        self.cache = Some(cache);
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Subscribe to signals emitted from now on.
    pub fn signals(&self) -> broadcast::Receiver<SyncSignal> {
        self.signals.subscribe()
    }

    /// Copy of the current state.
    pub async fn view(&self) -> SyncView {
        self.state.lock().await.view()
    }

    fn emit(&self, signal: SyncSignal) {
        // No receivers is fine.
        let _ = self.signals.send(signal);
    }

    /// Queue an action; a journal failure is logged and recorded.
    fn enqueue(state: &mut SyncState, action: QueuedAction) {
        let kind = action.kind();
        if let Err(e) = state.pending_queue.enqueue(action) {
            error!(kind, error = %e, "failed to persist queued action");
            state.last_error = Some(format!("failed to persist queued action: {}", e));
        }
        debug!(kind, pending = state.pending_queue.len(), "queued action");
    }

    /// Add a record.
    ///
    /// Offline, the add is queued and reported as accepted without any
    /// remote call. Online, the store is called; on failure the add is
    /// queued and the error is both recorded and reported. Never fails.
    pub async fn submit_add(&self, input: RecordInput) -> AddOutcome {
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.last_error = None;

            if !state.is_connected() {
                Self::enqueue(&mut state, QueuedAction::add_record(input));
                state.loading = false;
                drop(state);
                self.emit(SyncSignal::AddAccepted { queued: true });
                return AddOutcome::Queued;
            }
        }

        match self.remote.create(input.clone()).await {
            Ok(record) => {
                debug!(id = %record.id, "record created");
                self.state.lock().await.loading = false;
                self.emit(SyncSignal::AddAccepted { queued: false });
                AddOutcome::Sent
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(error = %e, "create failed, queued for retry");
                } else {
                    error!(error = %e, "create rejected, queued for retry");
                }
                let message = e.to_string();
                {
                    let mut state = self.state.lock().await;
                    Self::enqueue(&mut state, QueuedAction::add_record(input));
                    state.loading = false;
                    state.last_error = Some(message.clone());
                }
                self.emit(SyncSignal::AddFailed {
                    message: message.clone(),
                });
                AddOutcome::Failed { message }
            }
        }
    }

    /// Delete a record.
    ///
    /// Always calls the store; deletes are never queued. On success the
    /// record is removed from the custom records right away. On failure the
    /// error is recorded and the record stays.
    pub async fn submit_delete(&self, id: &str) -> DeleteOutcome {
        self.state.lock().await.loading = true;

        match self.remote.delete(id).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock().await;
                    state.custom_records.retain(|record| record.id != id);
                    state.loading = false;
                    self.store_cache(&state.custom_records);
                }
                info!(id, "record deleted");
                self.emit(SyncSignal::DeleteSucceeded { id: id.to_string() });
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(id, error = %e, "delete failed");
                let message = e.to_string();
                {
                    let mut state = self.state.lock().await;
                    state.last_error = Some(message.clone());
                    state.loading = false;
                }
                self.emit(SyncSignal::DeleteFailed {
                    id: id.to_string(),
                    message: message.clone(),
                });
                DeleteOutcome::Failed { message }
            }
        }
    }

    /// Fetch the seed records once and replace the current seed.
    ///
    /// Without a seed source the seed stays empty.
    pub async fn fetch_seed(&self) -> SeedOutcome {
        let generation = self.seed_generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.last_error = None;
        }

        let result = match &self.seed {
            Some(seed) => seed.fetch_all().await,
            None => Ok(Vec::new()),
        };

        let mut state = self.state.lock().await;
        if self.seed_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded seed fetch");
            return SeedOutcome::Superseded;
        }
        state.loading = false;

        match result {
            Ok(records) => {
                let count = records.len();
                state.seed_records = records;
                drop(state);
                debug!(count, "seed records loaded");
                self.emit(SyncSignal::SeedLoaded { count });
                SeedOutcome::Loaded { count }
            }
            Err(e) => {
                warn!(error = %e, "seed fetch failed");
                let message = e.to_string();
                state.last_error = Some(message.clone());
                drop(state);
                self.emit(SyncSignal::SeedFailed {
                    message: message.clone(),
                });
                SeedOutcome::Failed { message }
            }
        }
    }

    /// Replace the custom records with a subscription snapshot.
    pub async fn apply_snapshot(&self, records: Vec<Record>) {
        let count = records.len();
        {
            let mut state = self.state.lock().await;
            state.custom_records = records;
            self.store_cache(&state.custom_records);
        }
        debug!(count, "applied snapshot");
        self.emit(SyncSignal::RecordsChanged { count });
    }

    /// Report a subscription delivery error. Logged only.
    pub fn subscription_failed(&self, error: &RemoteError) {
        warn!(error = %error, "users subscription error");
    }

    pub(crate) async fn set_watcher(&self, watcher: WatcherState) {
        self.state.lock().await.watcher = watcher;
    }

    /// Record a connectivity reading.
    ///
    /// Entering `Connected` from any other state runs exactly one flush.
    /// A repeated reading changes nothing.
    pub async fn on_connectivity(&self, connected: bool) -> Option<FlushReport> {
        let to = Connectivity::from_reading(connected);
        {
            let mut state = self.state.lock().await;
            let from = state.connectivity;
            if from == to {
                debug!(?to, "connectivity unchanged");
                return None;
            }
            state.connectivity = to;
            info!(?from, ?to, "connectivity changed");
        }
        self.emit(SyncSignal::ConnectivityChanged { connected });

        if to == Connectivity::Connected {
            Some(self.flush().await)
        } else {
            None
        }
    }

    /// Replay the queued actions against the store.
    ///
    /// Works on the queue as it is when the pass starts; actions queued
    /// meanwhile wait for the next pass. Items are sent one at a time in
    /// FIFO order and a failure does not stop the pass. Afterwards every
    /// item of the pass is removed, including the ones that failed: each
    /// queued action gets at most one attempt per flush, and a failed one
    /// is lost.
    ///
    /// A journal-backed pass also holds the journal's flush lock, so
    /// processes sharing the journal take turns. If that lock cannot be
    /// taken the pass is skipped and the queue is left alone.
    pub async fn flush(&self) -> FlushReport {
        let _pass = self.flush_lock.lock().await;

        let flush_lock_path = self.state.lock().await.pending_queue.flush_lock_path();
        let _journal_pass = match flush_lock_path {
            Some(path) => match lock_journal_flush(path).await {
                Ok(guard) => Some(guard),
                Err(e) => {
                    error!(error = %e, "could not lock queue journal, skipping flush");
                    return FlushReport::default();
                }
            },
            None => None,
        };

        let batch = {
            let mut state = self.state.lock().await;
            if let Err(e) = state.pending_queue.refresh() {
                warn!(error = %e, "could not reload queue journal, flushing in-memory queue");
            }
            state.pending_queue.snapshot()
        };

        let mut report = FlushReport {
            attempted: batch.len(),
            dropped: 0,
        };

        for action in &batch {
            let result = match action {
                QueuedAction::AddRecord(input) => {
                    self.remote.create(input.clone()).await.map(|_| ())
                }
            };
            if let Err(e) = result {
                report.dropped += 1;
                warn!(kind = action.kind(), error = %e, "dropping queued action after failed replay");
            }
        }

        {
            let mut state = self.state.lock().await;
            if let Err(e) = state.pending_queue.remove_first(batch.len()) {
                error!(error = %e, "failed to remove flushed actions from queue");
            }
        }

        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                dropped = report.dropped,
                "flushed offline queue"
            );
        }
        self.emit(SyncSignal::Flushed {
            attempted: report.attempted,
            dropped: report.dropped,
        });
        report
    }

    /// Clear the session state, including pending actions.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        if let Err(e) = state.pending_queue.clear() {
            error!(error = %e, "failed to clear queue journal");
        }
        state.seed_records.clear();
        state.custom_records.clear();
        state.connectivity = Connectivity::Unknown;
        state.loading = false;
        state.last_error = None;
        state.watcher = WatcherState::Idle;
        self.store_cache(&state.custom_records);
    }

    fn store_cache(&self, records: &[Record]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(records) {
                warn!(path = %cache.path().display(), error = %e, "failed to write record cache");
            }
        }
    }
}

/// Take a journal's flush lock without stalling the runtime.
async fn lock_journal_flush(path: PathBuf) -> QueueResult<FlushGuard> {
    tokio::task::spawn_blocking(move || FlushGuard::acquire(&path))
        .await
        .map_err(|e| QueueError::Io(std::io::Error::other(e)))?
}
