// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Merged read view over seed and custom records.

use roster_core::Record;

/// Custom records followed by seed records.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection<'a> {
    seed: &'a [Record],
    custom: &'a [Record],
}

impl<'a> LocalProjection<'a> {
    pub fn new(seed: &'a [Record], custom: &'a [Record]) -> Self {
        LocalProjection { seed, custom }
    }

    /// All records, custom first, each group in its own order.
    pub fn combined(&self) -> Vec<&'a Record> {
        self.custom.iter().chain(self.seed.iter()).collect()
    }

    /// Records matching a search query.
    ///
    /// A blank query matches everything. Otherwise name and email match
    /// case-insensitively and phone matches as a plain substring.
    pub fn search(&self, query: &str) -> Vec<&'a Record> {
        let query = query.trim();
        if query.is_empty() {
            return self.combined();
        }
        let needle = query.to_lowercase();
        self.custom
            .iter()
            .chain(self.seed.iter())
            .filter(|record| matches_query(record, query, &needle))
            .collect()
    }

    /// Look up a record by id, preferring custom records.
    pub fn find(&self, id: &str) -> Option<&'a Record> {
        self.custom
            .iter()
            .chain(self.seed.iter())
            .find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.custom.len() + self.seed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches_query(record: &Record, query: &str, lowered: &str) -> bool {
    record.name.to_lowercase().contains(lowered)
        || record.email.to_lowercase().contains(lowered)
        || record.phone.contains(query)
}
