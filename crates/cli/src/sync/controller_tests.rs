// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync controller.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use super::cache::RecordCache;
use super::connectivity::Connectivity;
use super::controller::{
    AddOutcome, DeleteOutcome, FlushReport, SeedOutcome, SyncController, SyncSignal,
};
use super::queue::ActionQueue;
use super::remote::RemoteError;
use super::test_helpers::{input, record, seed_record, Call, MockRemoteStore, MockSeedSource};
use roster_core::QueuedAction;
use tempfile::tempdir;
use tokio::sync::broadcast;

fn controller(remote: &MockRemoteStore) -> SyncController<MockRemoteStore> {
    SyncController::new(remote.clone(), ActionQueue::in_memory())
}

async fn offline(remote: &MockRemoteStore) -> SyncController<MockRemoteStore> {
    let controller = controller(remote);
    assert_eq!(controller.on_connectivity(false).await, None);
    controller
}

fn queued_names(actions: &[QueuedAction]) -> Vec<String> {
    actions
        .iter()
        .map(|action| match action {
            QueuedAction::AddRecord(input) => input.name.clone(),
        })
        .collect()
}

fn drain(signals: &mut broadcast::Receiver<SyncSignal>) -> Vec<SyncSignal> {
    let mut seen = Vec::new();
    while let Ok(signal) = signals.try_recv() {
        seen.push(signal);
    }
    seen
}

#[tokio::test]
async fn test_offline_add_is_queued_without_remote_call() {
    let remote = MockRemoteStore::new();
    let controller = offline(&remote).await;
    let mut signals = controller.signals();

    let outcome = controller.submit_add(input("Ann")).await;

    assert_eq!(outcome, AddOutcome::Queued);
    assert!(remote.calls().is_empty());
    let view = controller.view().await;
    assert_eq!(queued_names(&view.pending_queue), vec!["Ann"]);
    assert!(!view.loading);
    assert_eq!(view.last_error, None);
    assert_eq!(drain(&mut signals), vec![SyncSignal::AddAccepted { queued: true }]);
}

#[tokio::test]
async fn test_online_add_makes_one_call_and_leaves_queue() {
    let remote = MockRemoteStore::new();
    let controller = controller(&remote);
    assert_eq!(controller.on_connectivity(true).await, Some(FlushReport::default()));
    let mut signals = controller.signals();

    let outcome = controller.submit_add(input("Ann")).await;

    assert_eq!(outcome, AddOutcome::Sent);
    assert_eq!(remote.calls(), vec![Call::Create("Ann".into())]);
    let view = controller.view().await;
    assert!(view.pending_queue.is_empty());
    assert!(!view.loading);
    assert_eq!(drain(&mut signals), vec![SyncSignal::AddAccepted { queued: false }]);
}

#[tokio::test]
async fn test_add_before_first_reading_goes_online() {
    let remote = MockRemoteStore::new();
    let controller = controller(&remote);
    assert_eq!(controller.view().await.connectivity, Connectivity::Unknown);

    assert_eq!(controller.submit_add(input("Ann")).await, AddOutcome::Sent);
    assert_eq!(remote.created_names(), vec!["Ann"]);
}

#[tokio::test]
async fn test_online_add_failure_queues_and_records_error() {
    let remote = MockRemoteStore::new();
    remote.fail_creates(Some(RemoteError::Unavailable("down".into())));
    let controller = controller(&remote);
    let mut signals = controller.signals();

    let outcome = controller.submit_add(input("Ann")).await;

    let message = "remote store unavailable: down".to_string();
    assert_eq!(
        outcome,
        AddOutcome::Failed {
            message: message.clone()
        }
    );
    let view = controller.view().await;
    assert_eq!(queued_names(&view.pending_queue), vec!["Ann"]);
    assert_eq!(view.last_error.as_deref(), Some(message.as_str()));
    assert!(!view.loading);
    assert_eq!(drain(&mut signals), vec![SyncSignal::AddFailed { message }]);
}

#[tokio::test]
async fn test_rejected_add_is_queued_too() {
    let remote = MockRemoteStore::new();
    remote.fail_create_for("Bad");
    let controller = controller(&remote);

    let outcome = controller.submit_add(input("Bad")).await;

    assert!(matches!(outcome, AddOutcome::Failed { .. }));
    assert_eq!(controller.view().await.pending_queue.len(), 1);
}

#[tokio::test]
async fn test_add_clears_previous_error() {
    let remote = MockRemoteStore::new();
    remote.fail_creates(Some(RemoteError::Closed));
    let controller = controller(&remote);
    controller.submit_add(input("Ann")).await;
    assert!(controller.view().await.last_error.is_some());

    remote.fail_creates(None);
    controller.submit_add(input("Bob")).await;
    assert_eq!(controller.view().await.last_error, None);
}

#[tokio::test]
async fn test_flush_replays_in_order_and_drops_failures() {
    let remote = MockRemoteStore::new();
    remote.fail_create_for("b");
    let controller = offline(&remote).await;
    controller.submit_add(input("a")).await;
    controller.submit_add(input("b")).await;
    let mut signals = controller.signals();

    let report = controller.flush().await;

    assert_eq!(
        report,
        FlushReport {
            attempted: 2,
            dropped: 1
        }
    );
    assert_eq!(remote.created_names(), vec!["a", "b"]);
    let view = controller.view().await;
    assert!(view.pending_queue.is_empty());
    assert_eq!(view.last_error, None);
    assert_eq!(
        drain(&mut signals),
        vec![SyncSignal::Flushed {
            attempted: 2,
            dropped: 1
        }]
    );
}

#[tokio::test]
async fn test_flush_keeps_going_after_every_failure() {
    let remote = MockRemoteStore::new();
    let controller = offline(&remote).await;
    for name in ["a", "b", "c"] {
        controller.submit_add(input(name)).await;
    }
    remote.fail_creates(Some(RemoteError::Timeout(Duration::from_secs(1))));

    let report = controller.flush().await;

    assert_eq!(report.dropped, 3);
    assert_eq!(remote.created_names(), vec!["a", "b", "c"]);
    assert!(controller.view().await.pending_queue.is_empty());
}

#[tokio::test]
async fn test_flush_of_empty_queue_makes_no_calls() {
    let remote = MockRemoteStore::new();
    let controller = controller(&remote);
    assert_eq!(controller.flush().await, FlushReport::default());
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_reconnect_triggers_exactly_one_flush() {
    let remote = MockRemoteStore::new();
    let controller = offline(&remote).await;
    controller.submit_add(input("a")).await;

    let report = controller.on_connectivity(true).await;
    assert_eq!(
        report,
        Some(FlushReport {
            attempted: 1,
            dropped: 0
        })
    );

    // A repeated reading must not flush again.
    controller.submit_add(input("b")).await;
    assert_eq!(controller.on_connectivity(true).await, None);
    assert_eq!(remote.created_names(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_going_offline_does_not_flush() {
    let remote = MockRemoteStore::new();
    let controller = controller(&remote);
    controller.on_connectivity(true).await;
    let mut signals = controller.signals();

    assert_eq!(controller.on_connectivity(false).await, None);
    assert!(!controller.view().await.is_connected);
    assert_eq!(
        drain(&mut signals),
        vec![SyncSignal::ConnectivityChanged { connected: false }]
    );
}

#[tokio::test]
async fn test_flushed_adds_arrive_through_snapshots() {
    let remote = MockRemoteStore::new();
    let controller = offline(&remote).await;
    controller.submit_add(input("a")).await;
    controller.on_connectivity(true).await;

    // The controller does not apply the create result itself.
    assert!(controller.view().await.custom_records.is_empty());
    controller.apply_snapshot(remote.records()).await;
    assert_eq!(controller.view().await.custom_records.len(), 1);
}

#[tokio::test]
async fn test_concurrent_add_during_flush_waits_for_next_pass() {
    let remote = MockRemoteStore::new();
    let controller = Arc::new(offline(&remote).await);
    controller.submit_add(input("a")).await;

    let flushing = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.flush().await })
    };
    controller.submit_add(input("late")).await;
    let report = flushing.await.unwrap();

    let view = controller.view().await;
    assert_eq!(
        report.attempted + view.pending_queue.len(),
        2,
        "every action is either flushed or still queued"
    );
}

#[tokio::test]
async fn test_delete_success_removes_locally() {
    let five = record("5", "Five", 5);
    let remote = MockRemoteStore::with_records(vec![five.clone()]);
    let controller = controller(&remote);
    controller.apply_snapshot(vec![five]).await;
    let mut signals = controller.signals();

    assert_eq!(controller.submit_delete("5").await, DeleteOutcome::Deleted);

    let view = controller.view().await;
    assert!(view.custom_records.is_empty());
    assert!(!view.loading);
    assert_eq!(
        drain(&mut signals),
        vec![SyncSignal::DeleteSucceeded { id: "5".into() }]
    );
}

#[tokio::test]
async fn test_delete_failure_keeps_record_and_sets_error() {
    let five = record("5", "Five", 5);
    let remote = MockRemoteStore::with_records(vec![five.clone()]);
    remote.fail_deletes(Some(RemoteError::Unavailable("down".into())));
    let controller = controller(&remote);
    controller.apply_snapshot(vec![five]).await;

    let outcome = controller.submit_delete("5").await;

    assert!(matches!(outcome, DeleteOutcome::Failed { .. }));
    let view = controller.view().await;
    assert_eq!(view.custom_records.len(), 1);
    assert!(view.last_error.is_some());
    assert!(!view.loading);
    assert!(view.pending_queue.is_empty(), "deletes are never queued");
}

#[tokio::test]
async fn test_delete_while_offline_still_calls_store() {
    let remote = MockRemoteStore::with_records(vec![record("5", "Five", 5)]);
    let controller = offline(&remote).await;

    controller.submit_delete("5").await;
    assert_eq!(remote.calls(), vec![Call::Delete("5".into())]);
}

#[tokio::test]
async fn test_snapshot_replaces_wholesale() {
    let remote = MockRemoteStore::new();
    let controller = controller(&remote);
    let r1 = record("r1", "One", 1);
    let r2 = record("r2", "Two", 2);
    let r3 = record("r3", "Three", 3);

    controller.apply_snapshot(vec![r2, r1]).await;
    controller.apply_snapshot(vec![r3.clone()]).await;

    assert_eq!(controller.view().await.custom_records, vec![r3]);
}

#[tokio::test]
async fn test_subscription_error_is_not_surfaced() {
    let remote = MockRemoteStore::new();
    let controller = controller(&remote);
    controller.subscription_failed(&RemoteError::Closed);
    assert_eq!(controller.view().await.last_error, None);
}

#[tokio::test]
async fn test_projection_puts_custom_before_seed() {
    let remote = MockRemoteStore::new();
    let controller = SyncController::new(remote.clone(), ActionQueue::in_memory())
        .with_seed(MockSeedSource::ok(vec![seed_record("s1", "Seed")]));
    controller.fetch_seed().await;
    controller.apply_snapshot(vec![record("c1", "Custom", 1)]).await;

    let view = controller.view().await;
    let ids: Vec<&str> = view
        .projection()
        .combined()
        .into_iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["c1", "s1"]);
}

#[tokio::test]
async fn test_fetch_seed_replaces_seed() {
    let remote = MockRemoteStore::new();
    let controller = SyncController::new(remote, ActionQueue::in_memory())
        .with_seed(MockSeedSource::ok(vec![seed_record("1", "A"), seed_record("2", "B")]));

    assert_eq!(controller.fetch_seed().await, SeedOutcome::Loaded { count: 2 });
    let view = controller.view().await;
    assert_eq!(view.seed_records.len(), 2);
    assert!(!view.loading);
}

#[tokio::test]
async fn test_fetch_seed_failure_sets_error() {
    let remote = MockRemoteStore::new();
    let controller = SyncController::new(remote, ActionQueue::in_memory())
        .with_seed(MockSeedSource::failing("boom"));

    let outcome = controller.fetch_seed().await;

    assert!(matches!(outcome, SeedOutcome::Failed { .. }));
    let view = controller.view().await;
    assert!(view.seed_records.is_empty());
    assert!(view.last_error.unwrap().contains("boom"));
}

#[tokio::test]
async fn test_fetch_seed_without_source_is_empty() {
    let controller = controller(&MockRemoteStore::new());
    assert_eq!(controller.fetch_seed().await, SeedOutcome::Loaded { count: 0 });
}

#[tokio::test]
async fn test_latest_seed_fetch_wins() {
    let remote = MockRemoteStore::new();
    let controller = Arc::new(
        SyncController::new(remote, ActionQueue::in_memory()).with_seed(
            MockSeedSource::ok(vec![seed_record("1", "A")]).delayed(Duration::from_millis(100)),
        ),
    );

    let first = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.fetch_seed().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = controller.fetch_seed().await;

    assert_eq!(first.await.unwrap(), SeedOutcome::Superseded);
    assert_eq!(second, SeedOutcome::Loaded { count: 1 });
    assert!(!controller.view().await.loading);
}

#[tokio::test]
async fn test_journal_backed_queue_survives_controller_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.jsonl");
    let remote = MockRemoteStore::new();

    {
        let controller = SyncController::new(remote.clone(), ActionQueue::open(&path).unwrap());
        controller.on_connectivity(false).await;
        controller.submit_add(input("Ann")).await;
    }

    let controller = SyncController::new(remote.clone(), ActionQueue::open(&path).unwrap());
    assert_eq!(controller.view().await.pending_queue.len(), 1);
    controller.flush().await;
    assert_eq!(remote.created_names(), vec!["Ann"]);
    assert!(ActionQueue::open(&path).unwrap().is_empty());
}

#[tokio::test]
async fn test_controllers_sharing_a_journal_replay_each_action_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.jsonl");
    let remote = MockRemoteStore::new();
    remote.delay_creates(Duration::from_millis(20));

    let mut writer = ActionQueue::open(&path).unwrap();
    writer.enqueue(QueuedAction::add_record(input("Ann"))).unwrap();
    writer.enqueue(QueuedAction::add_record(input("Bob"))).unwrap();

    let first = SyncController::new(remote.clone(), ActionQueue::open(&path).unwrap());
    let second = SyncController::new(remote.clone(), ActionQueue::open(&path).unwrap());
    let late = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.enqueue(QueuedAction::add_record(input("Late"))).unwrap();
    };

    let (a, b, ()) = tokio::join!(first.flush(), second.flush(), late);

    assert_eq!(remote.created_names(), vec!["Ann", "Bob", "Late"]);
    assert_eq!(a.attempted + b.attempted, 3);
    assert!(ActionQueue::open(&path).unwrap().is_empty());
}

#[tokio::test]
async fn test_cache_restores_last_snapshot() {
    let dir = tempdir().unwrap();
    let cache = RecordCache::new(&dir.path().join("records.jsonl"));
    let remote = MockRemoteStore::new();

    {
        let controller = controller(&remote).with_cache(cache.clone());
        controller.apply_snapshot(vec![record("c1", "Ann", 1)]).await;
    }

    let controller = controller(&remote).with_cache(cache);
    let view = controller.view().await;
    assert_eq!(view.custom_records.len(), 1);
    assert_eq!(view.custom_records[0].id, "c1");
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let remote = MockRemoteStore::new();
    let controller = offline(&remote).await;
    controller.submit_add(input("Ann")).await;
    controller.apply_snapshot(vec![record("c1", "Ann", 1)]).await;

    controller.reset().await;

    let view = controller.view().await;
    assert!(view.pending_queue.is_empty());
    assert!(view.custom_records.is_empty());
    assert_eq!(view.connectivity, Connectivity::Unknown);
}
