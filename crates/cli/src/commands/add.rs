// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use roster_core::RecordInput;
use tracing::info;

use crate::config::Config;
use crate::display::{format_add_outcome, format_flush_report};
use crate::error::Result;
use crate::sync::{AddOutcome, RemoteStore, SyncController};

use super::{is_reachable, open_controller};

pub async fn run(config: &Config, name: String, email: String, phone: String) -> Result<()> {
    let input = RecordInput::new(name, email).with_phone(phone);
    input.validate()?;

    let controller = open_controller(config)?;
    let reachable = is_reachable(config).await?;
    let outcome = run_impl(&controller, reachable, input).await;

    match outcome {
        AddOutcome::Failed { .. } => eprintln!("{}", format_add_outcome(&outcome)),
        _ => println!("{}", format_add_outcome(&outcome)),
    }
    Ok(())
}

/// Record the connectivity reading, then submit the add.
///
/// A reachable store first receives whatever earlier invocations queued.
pub(crate) async fn run_impl<R: RemoteStore>(
    controller: &SyncController<R>,
    reachable: bool,
    input: RecordInput,
) -> AddOutcome {
    if let Some(report) = controller.on_connectivity(reachable).await {
        if report.attempted > 0 {
            info!(attempted = report.attempted, "replayed queue before add");
            println!("{}", format_flush_report(&report));
        }
    }
    controller.submit_add(input).await
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
