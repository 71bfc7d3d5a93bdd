// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record ID generation for stores that assign identity on create.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::record::RecordInput;

const ID_PREFIX: &str = "u";

/// Generate a record ID from its input and creation time.
/// Format: u-{hash} where hash is first 8 hex chars of SHA256(name + email + timestamp)
pub fn generate_record_id(input: &RecordInput, created_at: &DateTime<Utc>) -> String {
    let seed = format!(
        "{}\u{1f}{}\u{1f}{}",
        input.name,
        input.email,
        created_at.to_rfc3339()
    );
    let hash = Sha256::digest(seed.as_bytes());
    format!("{}-{}", ID_PREFIX, hex::encode(&hash[..4]))
}

/// Generate a unique record ID, handling collisions by appending incrementing suffix.
///
/// Duplicate inputs replayed within the same instant share a base ID. The
/// first error from `exists` ends the search and is returned as is.
pub fn generate_unique_record_id<F, E>(
    input: &RecordInput,
    created_at: &DateTime<Utc>,
    exists: F,
) -> Result<String, E>
where
    F: Fn(&str) -> Result<bool, E>,
{
    let base_id = generate_record_id(input, created_at);

    if !exists(&base_id)? {
        return Ok(base_id);
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id)? {
            return Ok(id);
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
