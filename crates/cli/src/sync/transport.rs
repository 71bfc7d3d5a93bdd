// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket adapter for [`RemoteStore`].
//!
//! Requests share one command connection that is reopened on demand after
//! it drops. Each subscription owns its own connection and reconnects in
//! the background with exponential backoff, so a restarted server resumes
//! delivering snapshots without the caller re-subscribing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use roster_core::protocol::{ClientMessage, RequestId, ServerMessage};
use roster_core::{Record, RecordInput};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use super::backoff::Backoff;
use super::feed::Feed;
use super::remote::{
    BoxFuture, RemoteError, RemoteResult, RemoteStore, Subscription, SubscriptionEvent,
};

/// Connection settings for [`WsRemoteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    /// `ws://` or `wss://` endpoint of the remote store.
    pub url: String,
    /// Upper bound for connecting and for each request round trip.
    pub request_timeout: Duration,
    /// Delay schedule for subscription reconnects.
    pub backoff: Backoff,
}

impl WsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        WsConfig {
            url: url.into(),
            request_timeout: Duration::from_secs(10),
            backoff: Backoff::default(),
        }
    }
}

type PendingMap = Arc<StdMutex<HashMap<RequestId, oneshot::Sender<ServerMessage>>>>;

/// One open WebSocket with its reader and writer tasks.
struct Connection {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: PendingMap,
    closed: watch::Receiver<bool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Connection {
    /// Connect and start the I/O tasks.
    ///
    /// Snapshots and request-less errors go to `events` when given and are
    /// discarded otherwise.
    async fn open(
        url: &str,
        timeout: Duration,
        events: Option<mpsc::UnboundedSender<SubscriptionEvent>>,
    ) -> RemoteResult<Self> {
        let (ws, _) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url))
            .await
            .map_err(|_| RemoteError::Unavailable(format!("connect to {} timed out", url)))?
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        debug!(url, "connected to remote store");

        let (mut sink, mut stream) = ws.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));
        let (closed_tx, closed) = watch::channel(false);

        let writer = tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    debug!(error = %e, "websocket send failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_pending = Arc::clone(&pending);
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match ServerMessage::from_json(&text) {
                        Ok(message) => dispatch(message, &reader_pending, events.as_ref()),
                        Err(e) => warn!(error = %e, "ignoring malformed server message"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "websocket receive failed");
                        break;
                    }
                }
            }
            // Dropping the senders fails every waiting request with `Closed`.
            reader_pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
            let _ = closed_tx.send(true);
        });

        Ok(Connection {
            outgoing,
            pending,
            closed,
            reader,
            writer,
        })
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.writer.is_finished()
    }

    /// Wait until the reader has stopped.
    async fn wait_closed(&self) {
        let mut closed = self.closed.clone();
        let _ = closed.wait_for(|closed| *closed).await;
    }

    fn send(&self, message: &ClientMessage) -> RemoteResult<()> {
        let json = message
            .to_json()
            .map_err(|e| RemoteError::Protocol(e.to_string()))?;
        trace!(%json, "sending");
        self.outgoing
            .send(Message::Text(json.into()))
            .map_err(|_| RemoteError::Closed)
    }

    /// Send a request and wait for the response carrying its id.
    async fn request(
        &self,
        request_id: RequestId,
        message: &ClientMessage,
        timeout: Duration,
    ) -> RemoteResult<ServerMessage> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request_id, tx);

        if let Err(e) = self.send(message) {
            self.forget(request_id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(RemoteError::Closed),
            Err(_) => {
                self.forget(request_id);
                Err(RemoteError::Timeout(timeout))
            }
        }
    }

    fn forget(&self, request_id: RequestId) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request_id);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

fn dispatch(
    message: ServerMessage,
    pending: &PendingMap,
    events: Option<&mpsc::UnboundedSender<SubscriptionEvent>>,
) {
    if let Some(request_id) = message.request_id() {
        let waiter = pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request_id);
        match waiter {
            Some(tx) => {
                let _ = tx.send(message);
            }
            None => debug!(request_id, "response for unknown request"),
        }
        return;
    }

    match message {
        ServerMessage::Snapshot { records } => {
            if let Some(events) = events {
                let _ = events.send(SubscriptionEvent::Snapshot(records));
            }
        }
        ServerMessage::Error { message, .. } => {
            warn!(%message, "remote store reported an error");
            if let Some(events) = events {
                let _ = events.send(SubscriptionEvent::Error(RemoteError::Rejected(message)));
            }
        }
        ServerMessage::Pong { .. } => {}
        other => debug!(?other, "ignoring unsolicited message"),
    }
}

/// [`RemoteStore`] backed by a WebSocket connection to `roster-remote`.
pub struct WsRemoteStore {
    config: WsConfig,
    next_request: AtomicU64,
    commands: Mutex<Option<Arc<Connection>>>,
}

impl WsRemoteStore {
    pub fn new(config: WsConfig) -> Self {
        WsRemoteStore {
            config,
            next_request: AtomicU64::new(1),
            commands: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    fn next_request_id(&self) -> RequestId {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    /// Shared command connection, reopened if the previous one dropped.
    async fn command_connection(&self) -> RemoteResult<Arc<Connection>> {
        let mut commands = self.commands.lock().await;
        if let Some(connection) = commands.as_ref() {
            if !connection.is_closed() {
                return Ok(Arc::clone(connection));
            }
            debug!("command connection closed, reconnecting");
        }
        let connection = Arc::new(
            Connection::open(&self.config.url, self.config.request_timeout, None).await?,
        );
        *commands = Some(Arc::clone(&connection));
        Ok(connection)
    }

    async fn request(
        &self,
        build: impl FnOnce(RequestId) -> ClientMessage,
    ) -> RemoteResult<ServerMessage> {
        let connection = self.command_connection().await?;
        let request_id = self.next_request_id();
        let message = build(request_id);
        match connection
            .request(request_id, &message, self.config.request_timeout)
            .await?
        {
            ServerMessage::Error { message, .. } => Err(RemoteError::Rejected(message)),
            response => Ok(response),
        }
    }
}

impl RemoteStore for WsRemoteStore {
    fn create(&self, input: RecordInput) -> BoxFuture<'_, RemoteResult<Record>> {
        Box::pin(async move {
            match self
                .request(|request_id| ClientMessage::create(request_id, input))
                .await?
            {
                ServerMessage::Created { record, .. } => Ok(record),
                other => Err(RemoteError::Protocol(format!(
                    "unexpected response to create: {:?}",
                    other
                ))),
            }
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, RemoteResult<()>> {
        Box::pin(async move {
            match self
                .request(|request_id| ClientMessage::delete(request_id, id))
                .await?
            {
                ServerMessage::Deleted { .. } => Ok(()),
                other => Err(RemoteError::Protocol(format!(
                    "unexpected response to delete: {:?}",
                    other
                ))),
            }
        })
    }

    fn subscribe(&self) -> BoxFuture<'_, RemoteResult<Subscription>> {
        Box::pin(async move {
            let (events, events_rx) = mpsc::unbounded_channel();
            let connection = open_subscription(&self.config, events.clone()).await?;
            let task = tokio::spawn(keep_subscribed(self.config.clone(), connection, events));
            Ok(Feed::new(events_rx, move || task.abort()))
        })
    }
}

async fn open_subscription(
    config: &WsConfig,
    events: mpsc::UnboundedSender<SubscriptionEvent>,
) -> RemoteResult<Connection> {
    let connection = Connection::open(&config.url, config.request_timeout, Some(events)).await?;
    connection.send(&ClientMessage::Subscribe)?;
    Ok(connection)
}

/// Hold a subscription open, reconnecting after drops until the feed closes.
async fn keep_subscribed(
    config: WsConfig,
    mut connection: Connection,
    events: mpsc::UnboundedSender<SubscriptionEvent>,
) {
    loop {
        connection.wait_closed().await;
        if events.send(SubscriptionEvent::Error(RemoteError::Closed)).is_err() {
            return;
        }

        let mut delay = config.backoff.initial;
        connection = loop {
            debug!(?delay, "subscription dropped, reconnecting");
            tokio::time::sleep(delay).await;
            if events.is_closed() {
                return;
            }
            match open_subscription(&config, events.clone()).await {
                Ok(connection) => break connection,
                Err(e) => {
                    debug!(error = %e, "subscription reconnect failed");
                    delay = config.backoff.next(delay);
                }
            }
        };
        debug!("subscription restored");
    }
}
