// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::backoff::Backoff;
use std::time::Duration;
use yare::parameterized;

#[parameterized(
    doubles = { 100, 200 },
    doubles_again = { 400, 800 },
    caps = { 20_000, 30_000 },
    stays_capped = { 30_000, 30_000 },
)]
fn test_next_delay(current_ms: u64, expected_ms: u64) {
    let backoff = Backoff::default();
    assert_eq!(
        backoff.next(Duration::from_millis(current_ms)),
        Duration::from_millis(expected_ms)
    );
}

#[test]
fn test_custom_cap() {
    let backoff = Backoff::new(Duration::from_millis(10), Duration::from_millis(50));
    let mut delay = backoff.initial;
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(delay.as_millis());
        delay = backoff.next(delay);
    }
    assert_eq!(seen, vec![10, 20, 40, 50]);
}
