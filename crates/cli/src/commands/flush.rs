// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::Config;
use crate::display::format_flush_report;
use crate::error::{Error, Result};
use crate::sync::{FlushReport, RemoteStore, SyncController};

use super::{is_reachable, open_controller};

pub async fn run(config: &Config) -> Result<()> {
    let controller = open_controller(config)?;
    let reachable = is_reachable(config).await?;
    let report = run_impl(&controller, reachable, &config.remote.url).await?;
    println!("{}", format_flush_report(&report));
    Ok(())
}

/// Flush through the reconnect path so a pass runs exactly once.
pub(crate) async fn run_impl<R: RemoteStore>(
    controller: &SyncController<R>,
    reachable: bool,
    url: &str,
) -> Result<FlushReport> {
    if !reachable {
        return Err(Error::NotConnected {
            url: url.to_string(),
        });
    }
    Ok(controller.on_connectivity(true).await.unwrap_or_default())
}

#[cfg(test)]
#[path = "flush_tests.rs"]
mod tests;
