// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! roster-core: Shared library for the roster user directory
//!
//! This crate provides the record model, queued mutation intents, the
//! client-server wire protocol, and small storage primitives used by both
//! the `roster` client and the `roster-remote` store server.

pub mod action;
pub mod error;
pub mod id;
pub mod jsonl;
pub mod protocol;
pub mod record;

pub use action::QueuedAction;
pub use error::{Error, Result};
pub use id::{generate_record_id, generate_unique_record_id};
pub use record::{Record, RecordId, RecordInput};
