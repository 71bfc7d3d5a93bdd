// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Directory records and the input used to create them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity of a record, assigned by the remote store on creation.
pub type RecordId = String;

/// A user entry in the directory.
///
/// Records created through the remote store always carry `created_at`.
/// Seed records come from a one-shot listing that has no timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Builds a stored record from its input and the store-assigned fields.
    pub fn from_input(id: RecordId, input: RecordInput, created_at: DateTime<Utc>) -> Self {
        Record {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: Some(created_at),
        }
    }
}

/// Fields supplied by the user when adding a record.
///
/// Lacks `id` and `created_at`; both are assigned server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl RecordInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        RecordInput {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Checks the minimum a store accepts: non-blank name and email.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidRecord("name cannot be empty".into()));
        }
        if self.email.trim().is_empty() {
            return Err(Error::InvalidRecord("email cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
