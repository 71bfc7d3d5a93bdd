// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use roster_core::{Record, RecordInput};
use tokio::sync::mpsc;

use super::feed::Feed;
use super::remote::{
    BoxFuture, RemoteError, RemoteResult, RemoteStore, Subscription, SubscriptionEvent,
};
use super::seed::{SeedError, SeedResult, SeedSource};

/// Input with a phone derived from the name.
pub fn input(name: &str) -> RecordInput {
    RecordInput::new(name, format!("{}@example.com", name.to_lowercase()))
        .with_phone(format!("555-{}", name.len()))
}

/// Stored record with a fixed creation time offset by `secs`.
pub fn record(id: &str, name: &str, secs: i64) -> Record {
    let created_at = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
    Record::from_input(id.to_string(), input(name), created_at)
}

/// Seed record without a creation time.
pub fn seed_record(id: &str, name: &str) -> Record {
    Record {
        created_at: None,
        ..record(id, name, 0)
    }
}

/// Poll `check` until it holds, panicking after two seconds.
pub async fn wait_for<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}

/// Call recorded by [`MockRemoteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Delete(String),
    Subscribe,
}

#[derive(Default)]
struct MockInner {
    records: Vec<Record>,
    calls: Vec<Call>,
    next_id: u64,
    fail_all_creates: Option<RemoteError>,
    fail_names: HashSet<String>,
    fail_deletes: Option<RemoteError>,
    subscribe_failures: usize,
    subscribers: Vec<mpsc::UnboundedSender<SubscriptionEvent>>,
    create_delay: Duration,
}

impl MockInner {
    fn broadcast(&mut self) {
        let snapshot = self.records.clone();
        self.subscribers
            .retain(|tx| tx.send(SubscriptionEvent::Snapshot(snapshot.clone())).is_ok());
    }
}

/// In-memory remote store with scripted failures and a call log.
///
/// Successful creates are assigned `m-<n>` ids, prepended (newest first)
/// and pushed to every subscriber, like a live query would.
#[derive(Clone, Default)]
pub struct MockRemoteStore {
    inner: Arc<Mutex<MockInner>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records, newest first.
    pub fn with_records(records: Vec<Record>) -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().records = records;
        store
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Names passed to `create`, in call order.
    pub fn created_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().unwrap().records.clone()
    }

    /// Make every create fail with `error`, or succeed again with `None`.
    pub fn fail_creates(&self, error: Option<RemoteError>) {
        self.inner.lock().unwrap().fail_all_creates = error;
    }

    /// Make creates for one name fail.
    pub fn fail_create_for(&self, name: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_names
            .insert(name.to_string());
    }

    /// Hold every create for `delay` before it is applied.
    pub fn delay_creates(&self, delay: Duration) {
        self.inner.lock().unwrap().create_delay = delay;
    }

    pub fn fail_deletes(&self, error: Option<RemoteError>) {
        self.inner.lock().unwrap().fail_deletes = error;
    }

    /// Fail the next `count` subscribe calls.
    pub fn fail_subscribes(&self, count: usize) {
        self.inner.lock().unwrap().subscribe_failures = count;
    }

    /// Number of open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    /// Replace the stored records and push them to subscribers.
    pub fn push_snapshot(&self, records: Vec<Record>) {
        let mut inner = self.inner.lock().unwrap();
        inner.records = records;
        inner.broadcast();
    }

    /// Deliver a subscription error to every subscriber.
    pub fn push_error(&self, error: RemoteError) {
        let inner = self.inner.lock().unwrap();
        for tx in &inner.subscribers {
            let _ = tx.send(SubscriptionEvent::Error(error.clone()));
        }
    }
}

impl RemoteStore for MockRemoteStore {
    fn create(&self, input: RecordInput) -> BoxFuture<'_, RemoteResult<Record>> {
        Box::pin(async move {
            let delay = self.inner.lock().unwrap().create_delay;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::Create(input.name.clone()));

            if let Some(error) = &inner.fail_all_creates {
                return Err(error.clone());
            }
            if inner.fail_names.contains(&input.name) {
                return Err(RemoteError::Rejected(format!("{} refused", input.name)));
            }

            inner.next_id += 1;
            let created_at = Utc
                .timestamp_opt(1_800_000_000 + inner.next_id as i64, 0)
                .unwrap();
            let record = Record::from_input(format!("m-{}", inner.next_id), input, created_at);
            inner.records.insert(0, record.clone());
            inner.broadcast();
            Ok(record)
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, RemoteResult<()>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::Delete(id.to_string()));

            if let Some(error) = &inner.fail_deletes {
                return Err(error.clone());
            }
            let before = inner.records.len();
            inner.records.retain(|record| record.id != id);
            if inner.records.len() == before {
                return Err(RemoteError::Rejected(format!("no record {}", id)));
            }
            inner.broadcast();
            Ok(())
        })
    }

    fn subscribe(&self) -> BoxFuture<'_, RemoteResult<Subscription>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::Subscribe);

            if inner.subscribe_failures > 0 {
                inner.subscribe_failures -= 1;
                return Err(RemoteError::Unavailable("mock subscribe failure".into()));
            }

            let (tx, rx) = mpsc::unbounded_channel();
            let _ = tx.send(SubscriptionEvent::Snapshot(inner.records.clone()));
            inner.subscribers.push(tx);
            Ok(Feed::new(rx, || {}))
        })
    }
}

/// Seed source returning a fixed result after an optional delay.
pub struct MockSeedSource {
    records: Vec<Record>,
    failure: Option<String>,
    delay: Duration,
}

impl MockSeedSource {
    pub fn ok(records: Vec<Record>) -> Self {
        MockSeedSource {
            records,
            failure: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        MockSeedSource {
            records: Vec::new(),
            failure: Some(message.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SeedSource for MockSeedSource {
    fn fetch_all(&self) -> BoxFuture<'_, SeedResult<Vec<Record>>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            match &self.failure {
                Some(message) => Err(SeedError::Decode(message.clone())),
                None => Ok(self.records.clone()),
            }
        })
    }
}
