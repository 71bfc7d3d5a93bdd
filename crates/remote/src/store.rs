// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed canonical user collection.
//!
//! The store assigns `id` and `created_at` on insert. Listings are ordered
//! newest first; rows created in the same instant keep insertion order
//! reversed so the latest write still comes first.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use roster_core::{generate_unique_record_id, Record, RecordInput};

/// SQL schema for the user collection.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_created ON users(created_at DESC, seq DESC);
"#;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Invalid(#[from] roster_core::Error),

    #[error("user not found: {0}")]
    NotFound(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                Box::new(StoreError::CorruptedData(format!(
                    "invalid timestamp '{value}' in column 'created_at'"
                ))),
            )
        })
}

/// Fixed-width timestamps so text ordering matches time ordering.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Canonical user rows.
pub struct UserStore {
    conn: Connection,
}

impl UserStore {
    /// Open the store at the given path, creating it if needed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(UserStore { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(UserStore { conn })
    }

    /// Insert a user created now.
    pub fn insert(&self, input: RecordInput) -> StoreResult<Record> {
        self.insert_at(input, Utc::now())
    }

    /// Insert a user with an explicit creation time.
    pub fn insert_at(&self, input: RecordInput, created_at: DateTime<Utc>) -> StoreResult<Record> {
        input.validate()?;
        let created_at = created_at.trunc_subsecs(6);

        let id =
            generate_unique_record_id(&input, &created_at, |candidate| self.exists(candidate))?;

        self.conn.execute(
            "INSERT INTO users (id, name, email, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                input.name,
                input.email,
                input.phone,
                format_timestamp(&created_at),
            ],
        )?;

        Ok(Record::from_input(id, input, created_at))
    }

    /// Delete a user by id.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn exists(&self, id: &str) -> StoreResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// All users, newest first.
    pub fn list(&self) -> StoreResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, created_at FROM users
             ORDER BY created_at DESC, seq DESC",
        )?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<Record, rusqlite::Error> {
    let created: String = row.get(4)?;
    Ok(Record {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        created_at: Some(parse_timestamp(&created)?),
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
