// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use roster_core::QueuedAction;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_action_line;
use crate::error::Result;

use super::open_queue;

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let queue = open_queue(config)?;
    print!("{}", render(queue.actions(), format)?);
    Ok(())
}

pub(crate) fn render(actions: &[QueuedAction], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(actions)?)),
        OutputFormat::Text if actions.is_empty() => Ok("queue is empty\n".to_string()),
        OutputFormat::Text => Ok(actions
            .iter()
            .enumerate()
            .map(|(i, action)| format!("{}\n", format_action_line(i + 1, action)))
            .collect()),
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
