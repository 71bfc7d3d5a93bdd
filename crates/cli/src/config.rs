// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from a TOML file located at `--config <path>`,
//! else `$ROSTER_CONFIG`, else `<config_dir>/roster/config.toml`. A missing
//! default file means defaults. It includes:
//! - `state_dir`: where the offline queue and record cache live
//! - `[remote]`: WebSocket endpoint of the remote store and its timeouts
//! - `[seed]`: optional URL of the one-shot seed listing
//! - `[connectivity]`: reachability probe cadence

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{Backoff, HttpSeedSource, ProbeConnectivity, WsConfig};

const APP_DIR_NAME: &str = "roster";
const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_FILE_NAME: &str = "queue.jsonl";
const CACHE_FILE_NAME: &str = "records.jsonl";

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the queue journal and record cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    pub remote: RemoteConfig,
    pub seed: SeedConfig,
    pub connectivity: ConnectivityConfig,
}

/// Remote store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// WebSocket URL (`ws://...` or `wss://...`).
    pub url: String,
    /// Timeout for connecting and for each request, in milliseconds.
    pub request_timeout_ms: u64,
    /// First delay between subscription reconnect attempts.
    pub reconnect_initial_delay_ms: u64,
    /// Maximum delay between subscription reconnect attempts in seconds.
    pub reconnect_max_delay_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: "ws://127.0.0.1:7890".to_string(),
            request_timeout_ms: 10_000,
            reconnect_initial_delay_ms: 100,
            reconnect_max_delay_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Parses the endpoint, which must be a `ws://` or `wss://` URL with a host.
    pub fn parsed_url(&self) -> std::result::Result<Url, String> {
        let url = Url::parse(&self.url)
            .map_err(|e| format!("invalid remote URL '{}': {}", self.url, e))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(format!(
                "invalid remote URL '{}': must start with ws:// or wss://",
                self.url
            ));
        }
        if url.host_str().is_none() {
            return Err(format!("invalid remote URL '{}': missing host", self.url));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.reconnect_initial_delay_ms),
            Duration::from_secs(self.reconnect_max_delay_secs),
        )
    }

    pub fn ws_config(&self) -> WsConfig {
        WsConfig {
            url: self.url.clone(),
            request_timeout: self.request_timeout(),
            backoff: self.backoff(),
        }
    }
}

/// Seed listing settings. Without a URL the seed stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Reachability probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectivityConfig {
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            probe_interval_ms: 2_000,
            probe_timeout_ms: 1_000,
        }
    }
}

impl ConnectivityConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Config {
    /// Loads configuration, resolving the file location.
    ///
    /// An explicit path (argument or `$ROSTER_CONFIG`) must exist; the
    /// default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit.map(Path::to_path_buf).or_else(env::config_path);
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::ConfigNotFound(path.display().to_string()));
                }
                Self::load_from(&path)
            }
            None => match default_config_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Config::default()),
            },
        }
    }

    /// Loads configuration from a file, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content)?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |reason| Error::Config {
            path: path.display().to_string(),
            reason,
        };
        self.remote.parsed_url().map_err(invalid)?;
        if let Some(url) = &self.seed.url {
            let scheme = Url::parse(url).map(|parsed| parsed.scheme().to_string());
            if !matches!(scheme.as_deref(), Ok("http" | "https")) {
                return Err(invalid(format!(
                    "invalid seed URL '{}': must be an http:// or https:// URL",
                    url
                )));
            }
        }
        Ok(())
    }

    /// Resolved state directory: `$ROSTER_STATE_DIR`, then `state_dir`,
    /// then the platform state (or local data) directory.
    pub fn state_dir(&self) -> PathBuf {
        env::state_dir()
            .or_else(|| self.state_dir.clone())
            .or_else(|| {
                dirs::state_dir()
                    .or_else(dirs::data_local_dir)
                    .map(|dir| dir.join(APP_DIR_NAME))
            })
            .unwrap_or_else(|| PathBuf::from(".roster"))
    }

    /// Path of the offline queue journal.
    pub fn queue_path(&self) -> PathBuf {
        self.state_dir().join(QUEUE_FILE_NAME)
    }

    /// Path of the last-snapshot cache.
    pub fn cache_path(&self) -> PathBuf {
        self.state_dir().join(CACHE_FILE_NAME)
    }

    /// Seed source, if a seed URL is configured.
    pub fn seed_source(&self) -> Result<Option<HttpSeedSource>> {
        match &self.seed.url {
            Some(url) => Ok(Some(HttpSeedSource::new(
                url.clone(),
                self.remote.request_timeout(),
            )?)),
            None => Ok(None),
        }
    }

    /// Probe for the host of the remote URL.
    pub fn probe(&self) -> Result<ProbeConnectivity> {
        let url = self.remote.parsed_url().map_err(Error::InvalidUrl)?;
        ProbeConnectivity::for_url(
            &url,
            self.connectivity.probe_interval(),
            self.connectivity.probe_timeout(),
        )
        .ok_or_else(|| {
            Error::InvalidUrl(format!(
                "cannot derive host from remote URL '{}'",
                self.remote.url
            ))
        })
    }
}

/// `<config_dir>/roster/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
