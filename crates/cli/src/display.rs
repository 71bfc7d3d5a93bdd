// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use roster_core::{QueuedAction, Record};

use crate::sync::{AddOutcome, FlushReport, SyncSignal};

/// Format a record as a single line: `id  name <email> phone`.
pub fn format_record_line(record: &Record) -> String {
    let mut line = format!("{}  {} <{}>", record.id, record.name, record.email);
    if !record.phone.is_empty() {
        line.push_str("  ");
        line.push_str(&record.phone);
    }
    line
}

/// Format a queued action with its position in the queue (1-based).
pub fn format_action_line(position: usize, action: &QueuedAction) -> String {
    match action {
        QueuedAction::AddRecord(input) => {
            format!("{:>3}. add {} <{}>", position, input.name, input.email)
        }
    }
}

/// Message printed after an add.
pub fn format_add_outcome(outcome: &AddOutcome) -> String {
    match outcome {
        AddOutcome::Sent => "added".to_string(),
        AddOutcome::Queued => "queued (offline)".to_string(),
        AddOutcome::Failed { message } => format!("{}\nqueued for retry", message),
    }
}

/// Summary line for a flush pass.
pub fn format_flush_report(report: &FlushReport) -> String {
    if report.attempted == 0 {
        return "nothing to flush".to_string();
    }
    let sent = report.attempted - report.dropped;
    if report.dropped == 0 {
        format!("flushed {} queued action(s)", sent)
    } else {
        format!(
            "flushed {} queued action(s), dropped {} after failure",
            sent, report.dropped
        )
    }
}

/// One line per signal for `roster watch`.
pub fn format_signal(signal: &SyncSignal) -> String {
    match signal {
        SyncSignal::AddAccepted { queued: true } => "add queued".to_string(),
        SyncSignal::AddAccepted { queued: false } => "add sent".to_string(),
        SyncSignal::AddFailed { message } => format!("add failed, queued for retry: {}", message),
        SyncSignal::DeleteSucceeded { id } => format!("deleted {}", id),
        SyncSignal::DeleteFailed { id, message } => format!("delete {} failed: {}", id, message),
        SyncSignal::SeedLoaded { count } => format!("seed loaded: {} record(s)", count),
        SyncSignal::SeedFailed { message } => format!("seed failed: {}", message),
        SyncSignal::RecordsChanged { count } => format!("records: {}", count),
        SyncSignal::ConnectivityChanged { connected: true } => "online".to_string(),
        SyncSignal::ConnectivityChanged { connected: false } => "offline".to_string(),
        SyncSignal::Flushed { attempted, dropped } => format_flush_report(&FlushReport {
            attempted: *attempted,
            dropped: *dropped,
        }),
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
