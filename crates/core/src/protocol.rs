// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages between a client and the remote record store.
//!
//! The protocol is simple:
//! - Client sends create/delete requests tagged with a request id
//! - Server answers each request with the same id
//! - Subscribed clients receive the full ordered snapshot on every change

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordId, RecordInput};

/// Client-chosen correlation id echoed in responses.
pub type RequestId = u64;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a record. The server assigns id and creation time.
    Create {
        request_id: RequestId,
        input: RecordInput,
    },

    /// Delete a record by id.
    Delete {
        request_id: RequestId,
        id: RecordId,
    },

    /// Start receiving snapshots on this connection.
    ///
    /// The current snapshot is sent immediately.
    Subscribe,

    /// Stop receiving snapshots on this connection.
    Unsubscribe,

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Response to Create carrying the stored record.
    Created {
        request_id: RequestId,
        record: Record,
    },

    /// Response to Delete.
    Deleted { request_id: RequestId },

    /// Full collection, newest first.
    Snapshot { records: Vec<Record> },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Error message.
    ///
    /// `request_id` is set when the error answers a specific request.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
        message: String,
    },
}

impl ClientMessage {
    /// Creates a Create message.
    pub fn create(request_id: RequestId, input: RecordInput) -> Self {
        ClientMessage::Create { request_id, input }
    }

    /// Creates a Delete message.
    pub fn delete(request_id: RequestId, id: impl Into<RecordId>) -> Self {
        ClientMessage::Delete {
            request_id,
            id: id.into(),
        }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Returns the request id for messages that expect a correlated answer.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            ClientMessage::Create { request_id, .. } | ClientMessage::Delete { request_id, .. } => {
                Some(*request_id)
            }
            ClientMessage::Subscribe | ClientMessage::Unsubscribe | ClientMessage::Ping { .. } => {
                None
            }
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates a Created message.
    pub fn created(request_id: RequestId, record: Record) -> Self {
        ServerMessage::Created { request_id, record }
    }

    /// Creates a Deleted message.
    pub fn deleted(request_id: RequestId) -> Self {
        ServerMessage::Deleted { request_id }
    }

    /// Creates a Snapshot message.
    pub fn snapshot(records: Vec<Record>) -> Self {
        ServerMessage::Snapshot { records }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message not tied to a request.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            request_id: None,
            message: message.into(),
        }
    }

    /// Creates an Error message answering a request.
    pub fn request_error(request_id: RequestId, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            request_id: Some(request_id),
            message: message.into(),
        }
    }

    /// Returns the request id this message answers, if any.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            ServerMessage::Created { request_id, .. } | ServerMessage::Deleted { request_id } => {
                Some(*request_id)
            }
            ServerMessage::Error { request_id, .. } => *request_id,
            ServerMessage::Snapshot { .. } | ServerMessage::Pong { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
