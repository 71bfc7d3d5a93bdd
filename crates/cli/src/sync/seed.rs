// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot source of baseline records.

use std::time::Duration;

use roster_core::Record;
use serde::Deserialize;

use super::remote::BoxFuture;

/// Error type for seed fetches.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Request could not be sent or the body could not be read.
    #[error("seed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("seed request returned HTTP {0}")]
    Status(u16),

    /// Body was not a list of records.
    #[error("invalid seed data: {0}")]
    Decode(String),
}

/// Result type for seed fetches.
pub type SeedResult<T> = Result<T, SeedError>;

/// Baseline record listing, fetched once and never live.
pub trait SeedSource: Send + Sync {
    fn fetch_all(&self) -> BoxFuture<'_, SeedResult<Vec<Record>>>;
}

/// Fetches the seed list as JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SeedResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpSeedSource {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SeedSource for HttpSeedSource {
    fn fetch_all(&self) -> BoxFuture<'_, SeedResult<Vec<Record>>> {
        Box::pin(async move {
            let response = self.client.get(&self.url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SeedError::Status(status.as_u16()));
            }
            let body = response.text().await?;
            parse_seed(&body)
        })
    }
}

/// Seed entries as served by directory APIs: numeric or string ids, extra
/// fields ignored, no timestamps.
#[derive(Deserialize)]
struct SeedEntry {
    id: serde_json::Value,
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
}

/// Parse a JSON array of seed entries, keeping their order.
pub fn parse_seed(body: &str) -> SeedResult<Vec<Record>> {
    let entries: Vec<SeedEntry> =
        serde_json::from_str(body).map_err(|e| SeedError::Decode(e.to_string()))?;

    entries
        .into_iter()
        .map(|entry| {
            let id = match entry.id {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                other => return Err(SeedError::Decode(format!("unsupported id: {other}"))),
            };
            Ok(Record {
                id,
                name: entry.name,
                email: entry.email,
                phone: entry.phone,
                created_at: None,
            })
        })
        .collect()
}
