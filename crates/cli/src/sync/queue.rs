// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered queue of pending mutation intents.
//!
//! The queue is a sequence, not a set: duplicate payloads are kept and each
//! is replayed on its own. An in-memory queue lives for the session only.
//! A journal-backed queue mirrors every change to a JSONL file (one action
//! per line, fsynced) under an exclusive file lock, and treats the file as
//! the source of truth so several processes can share it. A second lock
//! file serializes whole flush passes across those processes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use roster_core::{jsonl, QueuedAction};

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Journal read/write error.
    #[error("journal error: {0}")]
    Journal(#[from] roster_core::Error),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// FIFO list of actions not yet confirmed delivered.
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: Vec<QueuedAction>,
    journal: Option<Journal>,
}

#[derive(Debug)]
struct Journal {
    path: PathBuf,
    lock_path: PathBuf,
    flush_lock_path: PathBuf,
}

fn lock_file(path: &Path) -> QueueResult<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(file)
}

impl Journal {
    fn lock(&self) -> QueueResult<File> {
        lock_file(&self.lock_path)
    }

    fn append(&self, action: &QueuedAction) -> QueueResult<Vec<QueuedAction>> {
        let _lock = self.lock()?;
        jsonl::append(&self.path, action)?;
        Ok(jsonl::read_all(&self.path)?)
    }
}

impl ActionQueue {
    /// Create a queue that is not persisted.
    pub fn in_memory() -> Self {
        ActionQueue::default()
    }

    /// Create or open a journal-backed queue at the given path.
    ///
    /// Existing entries are loaded in file order.
    pub fn open(path: &Path) -> QueueResult<Self> {
        let journal = Journal {
            path: path.to_path_buf(),
            lock_path: path.with_extension("lock"),
            flush_lock_path: path.with_extension("flush.lock"),
        };

        let actions = {
            let _lock = journal.lock()?;
            OpenOptions::new().create(true).append(true).open(path)?;
            jsonl::read_all(path)?
        };

        Ok(ActionQueue {
            actions,
            journal: Some(journal),
        })
    }

    /// Path of the journal file, if persisted.
    pub fn path(&self) -> Option<&Path> {
        self.journal.as_ref().map(|j| j.path.as_path())
    }

    /// Lock file guarding flush passes, if persisted.
    pub fn flush_lock_path(&self) -> Option<PathBuf> {
        self.journal.as_ref().map(|j| j.flush_lock_path.clone())
    }

    /// Append an action at the tail.
    ///
    /// The in-memory queue always gains the action. An error means the
    /// journal write failed and the action will not survive a restart.
    pub fn enqueue(&mut self, action: QueuedAction) -> QueueResult<()> {
        let Some(journal) = &self.journal else {
            self.actions.push(action);
            return Ok(());
        };

        match journal.append(&action) {
            Ok(actions) => {
                self.actions = actions;
                Ok(())
            }
            Err(e) => {
                self.actions.push(action);
                Err(e)
            }
        }
    }

    /// Re-read the journal so actions appended by other processes are visible.
    ///
    /// No-op for in-memory queues.
    pub fn refresh(&mut self) -> QueueResult<()> {
        if let Some(journal) = &self.journal {
            let _lock = journal.lock()?;
            self.actions = jsonl::read_all(&journal.path)?;
        }
        Ok(())
    }

    /// Borrow the queued actions in FIFO order.
    pub fn actions(&self) -> &[QueuedAction] {
        &self.actions
    }

    /// Copy of the queued actions, fixed at call time.
    pub fn snapshot(&self) -> Vec<QueuedAction> {
        self.actions.clone()
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Remove the first N actions from the queue.
    ///
    /// Actions appended after those N stay queued.
    pub fn remove_first(&mut self, count: usize) -> QueueResult<()> {
        let Some(journal) = &self.journal else {
            let count = count.min(self.actions.len());
            self.actions.drain(..count);
            return Ok(());
        };

        let _lock = journal.lock()?;
        let mut actions: Vec<QueuedAction> = jsonl::read_all(&journal.path)?;
        let count = count.min(actions.len());
        actions.drain(..count);
        jsonl::write_all(&journal.path, &actions)?;
        self.actions = actions;
        Ok(())
    }

    /// Clear all queued actions.
    pub fn clear(&mut self) -> QueueResult<()> {
        self.actions.clear();
        if let Some(journal) = &self.journal {
            let _lock = journal.lock()?;
            File::create(&journal.path)?;
        }
        Ok(())
    }
}

/// Exclusive claim on flushing a journal, released on drop.
///
/// Appends and reads only take the short journal lock, so other processes
/// keep queueing while a pass holds this.
#[derive(Debug)]
pub struct FlushGuard {
    _file: File,
}

impl FlushGuard {
    /// Block until no other handle holds the flush lock at `path`.
    pub fn acquire(path: &Path) -> QueueResult<Self> {
        Ok(FlushGuard {
            _file: lock_file(path)?,
        })
    }
}
