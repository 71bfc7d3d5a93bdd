// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-aware synchronization of the users collection.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  create/delete  ┌──────────────┐
//! │    Sync      │────────────────►│ RemoteStore  │
//! │  Controller  │◄────────────────│   (trait)    │
//! └──────────────┘    snapshots    └──────────────┘
//!    │       ▲
//!    │       │ transitions        ┌──────────────┐
//!    │       └────────────────────│ Connectivity │
//!    ▼                            │   Monitor    │
//! ┌──────────────┐                └──────────────┘
//! │ ActionQueue  │  (adds made offline, replayed on reconnect)
//! └──────────────┘
//! ```
//!
//! # Features
//!
//! - Adds go straight to the store when online and are queued otherwise
//! - A failed online add is queued for the next reconnect
//! - Every transition into `Connected` replays the queue once, in order
//! - Live snapshots replace the custom records wholesale
//! - Seed records are fetched once and shown after the custom records
//! - Injectable store, seed, and connectivity collaborators for testing

mod backoff;
mod cache;
mod connectivity;
mod controller;
mod feed;
mod projection;
mod queue;
mod remote;
mod seed;
mod session;
mod state;
mod transport;

pub use backoff::Backoff;
pub use cache::RecordCache;
pub use connectivity::{
    probe_target, Connectivity, ConnectivityListener, ConnectivityMonitor, ConnectivityProvider,
    ManualConnectivity, ProbeConnectivity, Transition,
};
pub use controller::{
    AddOutcome, DeleteOutcome, FlushReport, SeedOutcome, SyncController, SyncSignal,
};
pub use feed::Feed;
pub use projection::LocalProjection;
pub use queue::{ActionQueue, FlushGuard, QueueError, QueueResult};
pub use remote::{
    BoxFuture, RemoteError, RemoteResult, RemoteStore, Subscription, SubscriptionEvent,
};
pub use seed::{parse_seed, HttpSeedSource, SeedError, SeedResult, SeedSource};
pub use session::Session;
pub use state::{SyncState, SyncView, WatcherState};
pub use transport::{WsConfig, WsRemoteStore};

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
mod backoff_tests;


#[cfg(test)]
mod controller_tests;






#[cfg(test)]
mod transport_tests;
