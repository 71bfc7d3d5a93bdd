// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod completion;
pub mod delete;
pub mod flush;
pub mod list;
pub mod queue;
pub mod watch;

use std::fs;

use crate::config::Config;
use crate::error::Result;
use crate::sync::{ActionQueue, RecordCache, SyncController, WsRemoteStore};

/// Open the queue journal, creating the state directory if needed.
pub fn open_queue(config: &Config) -> Result<ActionQueue> {
    fs::create_dir_all(config.state_dir())?;
    Ok(ActionQueue::open(&config.queue_path())?)
}

/// Build a controller over the configured store, queue, cache and seed.
pub fn open_controller(config: &Config) -> Result<SyncController<WsRemoteStore>> {
    let queue = open_queue(config)?;
    let remote = WsRemoteStore::new(config.remote.ws_config());
    let controller = SyncController::new(remote, queue)
        .with_cache(RecordCache::new(&config.cache_path()));

    Ok(match config.seed_source()? {
        Some(seed) => controller.with_seed(seed),
        None => controller,
    })
}

/// Take one reachability reading of the remote host.
pub async fn is_reachable(config: &Config) -> Result<bool> {
    Ok(config.probe()?.probe().await)
}
