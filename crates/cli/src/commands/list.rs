// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use roster_core::Record;
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_record_line;
use crate::error::Result;
use crate::sync::{RemoteResult, RemoteStore, SeedOutcome, SubscriptionEvent, SyncController};

use super::{is_reachable, open_controller};

pub async fn run(config: &Config, query: Option<&str>, format: OutputFormat) -> Result<()> {
    let controller = open_controller(config)?;
    let reachable = is_reachable(config).await?;
    let records = run_impl(
        &controller,
        reachable,
        query.unwrap_or_default(),
        config.remote.request_timeout(),
    )
    .await;

    match format {
        OutputFormat::Text => {
            for record in &records {
                println!("{}", format_record_line(record));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}

/// Refresh what can be refreshed, then search the merged view.
///
/// Custom records come from a live snapshot when the store is reachable and
/// from the last cached snapshot otherwise.
pub(crate) async fn run_impl<R: RemoteStore>(
    controller: &SyncController<R>,
    reachable: bool,
    query: &str,
    timeout: Duration,
) -> Vec<Record> {
    if reachable {
        match tokio::time::timeout(timeout, load_snapshot(controller)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "using cached records"),
            Err(_) => warn!(?timeout, "snapshot timed out, using cached records"),
        }
    } else {
        debug!("remote store unreachable, using cached records");
    }

    if let SeedOutcome::Failed { message } = controller.fetch_seed().await {
        eprintln!("warning: {}", message);
    }

    let view = controller.view().await;
    view.projection()
        .search(query)
        .into_iter()
        .cloned()
        .collect()
}

/// Subscribe just long enough to receive the current snapshot.
async fn load_snapshot<R: RemoteStore>(controller: &SyncController<R>) -> RemoteResult<()> {
    let mut subscription = controller.remote().subscribe().await?;
    while let Some(event) = subscription.next().await {
        match event {
            SubscriptionEvent::Snapshot(records) => {
                controller.apply_snapshot(records).await;
                break;
            }
            SubscriptionEvent::Error(e) => controller.subscription_failed(&e),
        }
    }
    subscription.close();
    Ok(())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
