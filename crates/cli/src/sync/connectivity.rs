// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity readings and the transition monitor.
//!
//! A [`ConnectivityProvider`] reports a boolean reading once when a listener
//! registers and again on every change it notices. Providers may repeat a
//! reading; [`ConnectivityMonitor`] collapses the readings into transitions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use super::feed::Feed;

/// Stream of boolean connectivity readings.
pub type ConnectivityListener = Feed<bool>;

/// Source of network status readings.
pub trait ConnectivityProvider: Send + Sync {
    /// Register a listener. The first reading arrives without waiting for a change.
    fn listen(&self) -> ConnectivityListener;
}

/// Observed connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// No reading yet.
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn from_reading(connected: bool) -> Self {
        if connected {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        }
    }

    /// Whether remote calls should be attempted.
    ///
    /// `Unknown` counts as connected: before the first reading writes go
    /// straight to the store and fall back to the queue on failure.
    pub fn is_connected(self) -> bool {
        !matches!(self, Connectivity::Disconnected)
    }
}

/// A change between two observed states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Connectivity,
    pub to: Connectivity,
}

impl Transition {
    /// True when entering `Connected` from any other state.
    pub fn is_reconnect(&self) -> bool {
        self.to == Connectivity::Connected && self.from != Connectivity::Connected
    }
}

/// Turns raw readings into a sequence of transitions.
///
/// Nothing is read until [`next_transition`](Self::next_transition) is
/// awaited. Starting a new monitor from the same provider begins again
/// from `Unknown`.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    listener: ConnectivityListener,
    state: Connectivity,
}

impl ConnectivityMonitor {
    /// Register with the provider and start in `Unknown`.
    pub fn start(provider: &dyn ConnectivityProvider) -> Self {
        ConnectivityMonitor {
            listener: provider.listen(),
            state: Connectivity::Unknown,
        }
    }

    /// Last observed state.
    pub fn state(&self) -> Connectivity {
        self.state
    }

    /// Wait for the next reading that differs from the current state.
    ///
    /// Returns `None` when the provider stops reporting.
    pub async fn next_transition(&mut self) -> Option<Transition> {
        loop {
            let reading = self.listener.next().await?;
            let to = Connectivity::from_reading(reading);
            if to == self.state {
                debug!(?to, "ignoring repeated connectivity reading");
                continue;
            }
            let transition = Transition {
                from: self.state,
                to,
            };
            self.state = to;
            return Some(transition);
        }
    }

    /// Release the provider listener.
    pub fn stop(self) {
        self.listener.close();
    }
}

/// Provider driven by the embedding application.
///
/// Every [`set`](Self::set) is forwarded to all listeners, repeats included.
#[derive(Clone)]
pub struct ManualConnectivity {
    inner: Arc<Mutex<ManualInner>>,
}

struct ManualInner {
    current: bool,
    next_id: u64,
    listeners: HashMap<u64, mpsc::UnboundedSender<bool>>,
}

impl ManualConnectivity {
    /// Create a provider whose first reading is `initial`.
    pub fn new(initial: bool) -> Self {
        ManualConnectivity {
            inner: Arc::new(Mutex::new(ManualInner {
                current: initial,
                next_id: 0,
                listeners: HashMap::new(),
            })),
        }
    }

    /// Report a reading to every listener.
    pub fn set(&self, connected: bool) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.current = connected;
        inner
            .listeners
            .retain(|_, tx| tx.send(connected).is_ok());
    }

    /// Current reading.
    pub fn get(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.listeners.retain(|_, tx| !tx.is_closed());
        inner.listeners.len()
    }
}

impl ConnectivityProvider for ManualConnectivity {
    fn listen(&self) -> ConnectivityListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = inner.next_id;
            inner.next_id += 1;
            let _ = tx.send(inner.current);
            inner.listeners.insert(id, tx);
            id
        };

        let inner = Arc::clone(&self.inner);
        Feed::new(rx, move || {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&id);
        })
    }
}

/// Provider that checks whether the remote host accepts TCP connections.
///
/// Each listener gets its own polling task, which reports the initial
/// reading and then only changes.
#[derive(Debug, Clone)]
pub struct ProbeConnectivity {
    target: String,
    interval: Duration,
    timeout: Duration,
}

impl ProbeConnectivity {
    /// Probe `target` (`host:port`) every `interval`, failing a probe after `timeout`.
    pub fn new(target: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        ProbeConnectivity {
            target: target.into(),
            interval,
            timeout,
        }
    }

    /// Build a probe for the host of a `ws://` or `wss://` URL.
    pub fn for_url(url: &Url, interval: Duration, timeout: Duration) -> Option<Self> {
        probe_target(url).map(|target| ProbeConnectivity::new(target, interval, timeout))
    }

    /// Address being probed.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Take a single reading.
    pub async fn probe(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(&self.target)).await,
            Ok(Ok(_))
        )
    }
}

impl ConnectivityProvider for ProbeConnectivity {
    /// Must be called from within a tokio runtime.
    fn listen(&self) -> ConnectivityListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let probe = self.clone();

        let handle = tokio::spawn(async move {
            let mut last = None;
            loop {
                let reading = probe.probe().await;
                if last != Some(reading) {
                    debug!(target = %probe.target, reading, "connectivity probe changed");
                    if tx.send(reading).is_err() {
                        break;
                    }
                    last = Some(reading);
                }
                tokio::select! {
                    _ = tokio::time::sleep(probe.interval) => {}
                    _ = tx.closed() => break,
                }
            }
        });

        Feed::new(rx, move || handle.abort())
    }
}

/// `host:port` of a WebSocket URL, defaulting the port by scheme.
pub fn probe_target(url: &Url) -> Option<String> {
    if !matches!(url.scheme(), "ws" | "wss") {
        return None;
    }
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}
