// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the WebSocket remote store against a scripted server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use roster_core::protocol::{ClientMessage, ServerMessage};
use roster_core::Record;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

use super::backoff::Backoff;
use super::remote::{RemoteError, RemoteStore, SubscriptionEvent};
use super::test_helpers::input;
use super::transport::{WsConfig, WsRemoteStore};

#[derive(Clone, Copy, PartialEq)]
enum Script {
    /// Answer every request.
    Normal,
    /// Read requests but never answer.
    Silent,
    /// Close the first connection right after its first snapshot.
    DropFirstSubscription,
}

struct ScriptedServer {
    url: String,
    connections: Arc<AtomicUsize>,
}

impl ScriptedServer {
    async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let records = Arc::new(Mutex::new(Vec::<Record>::new()));

        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let number = counter.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::spawn(serve(stream, script, number, Arc::clone(&records)));
            }
        });

        ScriptedServer { url, connections }
    }

    fn store(&self) -> WsRemoteStore {
        WsRemoteStore::new(WsConfig {
            url: self.url.clone(),
            request_timeout: Duration::from_millis(300),
            backoff: Backoff::new(Duration::from_millis(10), Duration::from_millis(50)),
        })
    }
}

async fn serve(stream: TcpStream, script: Script, number: usize, records: Arc<Mutex<Vec<Record>>>) {
    let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    let (mut sink, mut stream) = ws.split();

    while let Some(Ok(Message::Text(text))) = stream.next().await {
        let reply = match ClientMessage::from_json(&text).unwrap() {
            ClientMessage::Create { request_id, input } => {
                if input.name == "reject" {
                    ServerMessage::request_error(request_id, "name not allowed")
                } else {
                    let mut records = records.lock().unwrap();
                    let id = format!("t-{}", records.len() + 1);
                    let record = Record::from_input(id, input, Utc::now());
                    records.insert(0, record.clone());
                    ServerMessage::created(request_id, record)
                }
            }
            ClientMessage::Delete { request_id, .. } => ServerMessage::deleted(request_id),
            ClientMessage::Subscribe => {
                let mut snapshot = records.lock().unwrap().clone();
                snapshot.push(Record::from_input(
                    format!("conn-{}", number),
                    input("Marker"),
                    Utc::now(),
                ));
                ServerMessage::snapshot(snapshot)
            }
            ClientMessage::Ping { id } => ServerMessage::pong(id),
            ClientMessage::Unsubscribe => continue,
        };

        if script == Script::Silent {
            continue;
        }
        let json = reply.to_json().unwrap();
        if sink.send(Message::Text(json.into())).await.is_err() {
            return;
        }
        if script == Script::DropFirstSubscription && number == 1 {
            let _ = sink.close().await;
            return;
        }
    }
}

async fn next_event(subscription: &mut super::remote::Subscription) -> SubscriptionEvent {
    tokio::time::timeout(Duration::from_secs(2), subscription.next())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_create_returns_assigned_record() {
    let server = ScriptedServer::start(Script::Normal).await;
    let store = server.store();

    let record = store.create(input("Ann")).await.unwrap();
    assert_eq!(record.id, "t-1");
    assert_eq!(record.name, "Ann");
    assert!(record.created_at.is_some());

    // Requests share one connection.
    store.create(input("Bob")).await.unwrap();
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_response_is_rejected() {
    let server = ScriptedServer::start(Script::Normal).await;
    let store = server.store();

    let err = store.create(input("reject")).await.unwrap_err();
    assert_eq!(err, RemoteError::Rejected("name not allowed".into()));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_delete() {
    let server = ScriptedServer::start(Script::Normal).await;
    server.store().delete("t-1").await.unwrap();
}

#[tokio::test]
async fn test_unreachable_store_is_unavailable() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let store = WsRemoteStore::new(WsConfig::new(format!("ws://{}", addr)));

    let err = store.create(input("Ann")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
    assert!(err.is_transient());
    assert!(matches!(
        store.subscribe().await,
        Err(RemoteError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_silent_store_times_out() {
    let server = ScriptedServer::start(Script::Silent).await;
    let store = server.store();

    let err = store.create(input("Ann")).await.unwrap_err();
    assert_eq!(err, RemoteError::Timeout(Duration::from_millis(300)));
}

#[tokio::test]
async fn test_subscription_receives_snapshots() {
    let server = ScriptedServer::start(Script::Normal).await;
    let store = server.store();
    let mut subscription = store.subscribe().await.unwrap();

    match next_event(&mut subscription).await {
        SubscriptionEvent::Snapshot(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id, "conn-1");
        }
        other => panic!("expected snapshot, got {:?}", other),
    }
    subscription.close();
}

#[tokio::test]
async fn test_subscription_recovers_after_drop() {
    let server = ScriptedServer::start(Script::DropFirstSubscription).await;
    let store = server.store();
    let mut subscription = store.subscribe().await.unwrap();

    assert!(matches!(
        next_event(&mut subscription).await,
        SubscriptionEvent::Snapshot(_)
    ));
    assert_eq!(
        next_event(&mut subscription).await,
        SubscriptionEvent::Error(RemoteError::Closed)
    );
    match next_event(&mut subscription).await {
        SubscriptionEvent::Snapshot(records) => assert_eq!(records[0].id, "conn-2"),
        other => panic!("expected snapshot, got {:?}", other),
    }
}

#[tokio::test]
async fn test_command_connection_reopens_after_drop() {
    let server = ScriptedServer::start(Script::DropFirstSubscription).await;
    let store = server.store();

    // Connection 1 closes after its first reply; the create still succeeds.
    store.create(input("Ann")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.create(input("Bob")).await.unwrap();
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
}
