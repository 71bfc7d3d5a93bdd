// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote record store abstraction.
//!
//! The remote store is authoritative. It supports create and delete, and a
//! live subscription that pushes the full ordered collection (newest first)
//! after every change, whoever made it.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use roster_core::{Record, RecordInput};

use super::feed::Feed;

/// Boxed future returned by collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for remote store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Store could not be reached.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// Connection dropped before the store answered.
    #[error("connection closed")]
    Closed,

    /// No answer within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Store refused the request.
    #[error("rejected by remote store: {0}")]
    Rejected(String),

    /// Store answered with something unexpected.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl RemoteError {
    /// True for network/availability failures that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::Unavailable(_) | RemoteError::Closed | RemoteError::Timeout(_)
        )
    }
}

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Event delivered by a live subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// Full collection ordered by creation time, newest first.
    Snapshot(Vec<Record>),
    /// Delivery error. The subscription stays open.
    Error(RemoteError),
}

/// Live subscription to the remote collection.
pub type Subscription = Feed<SubscriptionEvent>;

/// Remote, authoritative record collection.
///
/// Methods take `&self` so that one store can serve concurrent handlers
/// while a subscription is running.
pub trait RemoteStore: Send + Sync {
    /// Create a record from input; the store assigns id and creation time.
    fn create(&self, input: RecordInput) -> BoxFuture<'_, RemoteResult<Record>>;

    /// Delete a record by id.
    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, RemoteResult<()>>;

    /// Open a live subscription.
    ///
    /// Resolves once the subscription is established. Transport errors after
    /// that are reported as [`SubscriptionEvent::Error`] and recovered by the
    /// store.
    fn subscribe(&self) -> BoxFuture<'_, RemoteResult<Subscription>>;
}
