// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pull-based view over a push-based listener.
//!
//! Collaborators that deliver events through callbacks (a live query, a
//! network-status listener) hand out a [`Feed`]: the producer side keeps
//! the sender, the consumer awaits [`Feed::next`]. Closing or dropping the
//! feed runs the producer's unsubscribe hook exactly once.

use tokio::sync::mpsc;

type Unsubscribe = Box<dyn FnOnce() + Send>;

/// Lazily consumed stream of events from a long-lived listener.
pub struct Feed<T> {
    events: mpsc::UnboundedReceiver<T>,
    unsubscribe: Option<Unsubscribe>,
}

impl<T> Feed<T> {
    /// Wrap a receiver together with the hook that releases the listener.
    pub fn new(
        events: mpsc::UnboundedReceiver<T>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Feed {
            events,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Create a connected sender/feed pair with a no-op unsubscribe hook.
    pub fn channel() -> (mpsc::UnboundedSender<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Feed::new(rx, || {}))
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the producer has gone away.
    pub async fn next(&mut self) -> Option<T> {
        self.events.recv().await
    }

    /// Release the listener.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.events.close();
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl<T> Drop for Feed<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> std::fmt::Debug for Feed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("open", &self.unsubscribe.is_some())
            .finish()
    }
}
