// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_default_log_filter() {
    assert_eq!(default_log_filter(false), "warn");
    assert!(default_log_filter(true).contains("roster=debug"));
}

#[tokio::test]
async fn test_queue_command_with_explicit_config() {
    let temp = tempfile::TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("state_dir = {:?}\n", temp.path().join("state")),
    )
    .unwrap();

    let cli = <Cli as clap::Parser>::parse_from([
        "roster",
        "--config",
        config_path.to_str().unwrap(),
        "queue",
    ]);
    run(cli).await.unwrap();
    assert!(temp.path().join("state").join("queue.jsonl").exists());
}

#[tokio::test]
async fn test_missing_explicit_config_fails() {
    let cli = <Cli as clap::Parser>::parse_from([
        "roster",
        "--config",
        "/nonexistent/roster/config.toml",
        "queue",
    ]);
    assert!(matches!(run(cli).await, Err(Error::ConfigNotFound(_))));
}
