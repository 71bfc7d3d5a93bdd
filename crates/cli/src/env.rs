// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `ROSTER_CONFIG` if set and non-empty.
pub fn config_path() -> Option<PathBuf> {
    non_empty_var(vars::ROSTER_CONFIG).map(PathBuf::from)
}

/// Returns the value of `ROSTER_STATE_DIR` if set and non-empty.
pub fn state_dir() -> Option<PathBuf> {
    non_empty_var(vars::ROSTER_STATE_DIR).map(PathBuf::from)
}

/// Returns `true` if `RUST_LOG` is set.
pub fn log_filter_set() -> bool {
    std::env::var_os(vars::RUST_LOG).is_some()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
