// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::Config;
use crate::error::{Error, Result};
use crate::sync::{DeleteOutcome, RemoteStore, SyncController};

use super::open_controller;

pub async fn run(config: &Config, id: &str) -> Result<()> {
    let controller = open_controller(config)?;
    run_impl(&controller, id).await?;
    println!("deleted {}", id);
    Ok(())
}

/// Deletes are sent straight to the store and never queued.
pub(crate) async fn run_impl<R: RemoteStore>(controller: &SyncController<R>, id: &str) -> Result<()> {
    match controller.submit_delete(id).await {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::Failed { message } => Err(Error::DeleteFailed {
            id: id.to_string(),
            message,
        }),
    }
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
