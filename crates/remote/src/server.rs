// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Handles client connections, request routing, and snapshot fanout to
//! subscribed connections.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use roster_core::protocol::{ClientMessage, ServerMessage};

use crate::state::ServerState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", listener.local_addr()?);
    serve(listener, state).await?;
    Ok(())
}

/// Accept connections on a bound listener until it fails.
pub(crate) async fn serve(listener: TcpListener, state: ServerState) -> std::io::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Wait for the next published snapshot, or forever when not subscribed.
async fn next_broadcast(
    rx: &mut Option<broadcast::Receiver<ServerMessage>>,
) -> Result<ServerMessage, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), BoxError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    // Set while the client is subscribed to the collection.
    let mut subscription: Option<broadcast::Receiver<ServerMessage>> = None;

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = match handle_client_message(&text, &state, &mut subscription).await {
                            Ok(response) => response,
                            Err(e) => Some(ServerMessage::error(e.to_string())),
                        };
                        if let Some(response) = response {
                            ws_sink.send(Message::Text(response.to_json()?.into())).await?;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", peer_addr);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", peer_addr, e);
                        break;
                    }
                    None => {
                        info!("Client {} stream ended", peer_addr);
                        break;
                    }
                }
            }

            broadcast = next_broadcast(&mut subscription) => {
                let msg = match broadcast {
                    Ok(msg) => msg,
                    Err(RecvError::Lagged(n)) => {
                        warn!("Client {} lagged by {} snapshots, resending current", peer_addr, n);
                        ServerMessage::snapshot(state.snapshot().await?)
                    }
                    Err(RecvError::Closed) => break,
                };
                if let Err(e) = ws_sink.send(Message::Text(msg.to_json()?.into())).await {
                    warn!("Failed to send snapshot to {}: {}", peer_addr, e);
                    break;
                }
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process a client message and return an optional response.
///
/// Store failures on create and delete are answered with an error tagged
/// by the request id; other failures propagate.
async fn handle_client_message(
    text: &str,
    state: &ServerState,
    subscription: &mut Option<broadcast::Receiver<ServerMessage>>,
) -> Result<Option<ServerMessage>, BoxError> {
    let msg = ClientMessage::from_json(text)?;
    debug!("Received message: {:?}", msg);

    match msg {
        ClientMessage::Create { request_id, input } => match state.create(input).await {
            Ok(record) => {
                debug!(id = %record.id, "user created");
                Ok(Some(ServerMessage::created(request_id, record)))
            }
            Err(e) => Ok(Some(ServerMessage::request_error(request_id, e.to_string()))),
        },

        ClientMessage::Delete { request_id, id } => match state.delete(&id).await {
            Ok(()) => {
                debug!(%id, "user deleted");
                Ok(Some(ServerMessage::deleted(request_id)))
            }
            Err(e) => Ok(Some(ServerMessage::request_error(request_id, e.to_string()))),
        },

        ClientMessage::Subscribe => {
            let (records, rx) = state.watch().await?;
            debug!("Subscribe: sending {} records", records.len());
            *subscription = Some(rx);
            Ok(Some(ServerMessage::snapshot(records)))
        }

        ClientMessage::Unsubscribe => {
            *subscription = None;
            Ok(None)
        }

        ClientMessage::Ping { id } => {
            debug!("Ping received: {}", id);
            Ok(Some(ServerMessage::pong(id)))
        }
    }
}
