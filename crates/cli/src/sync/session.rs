// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session composition root.
//!
//! A [`Session`] owns the long-lived watchers of one login: the users
//! subscription and the connectivity listener. Both are released on
//! [`Session::teardown`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backoff::Backoff;
use super::connectivity::{Connectivity, ConnectivityMonitor, ConnectivityProvider};
use super::controller::SyncController;
use super::remote::{RemoteStore, SubscriptionEvent};
use super::state::WatcherState;
use super::transport::WsRemoteStore;

/// Running watchers around a shared [`SyncController`].
pub struct Session<R: RemoteStore + 'static = WsRemoteStore> {
    controller: Arc<SyncController<R>>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl<R: RemoteStore + 'static> Session<R> {
    /// Start the subscription and connectivity watchers.
    ///
    /// The connectivity listener is registered before this returns. The
    /// subscription is retried with `backoff` until it is established.
    pub fn start(
        controller: Arc<SyncController<R>>,
        connectivity: &dyn ConnectivityProvider,
        backoff: Backoff,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        let monitor = ConnectivityMonitor::start(connectivity);

        let tasks = vec![
            tokio::spawn(watch_subscription(
                Arc::clone(&controller),
                backoff,
                shutdown.subscribe(),
            )),
            tokio::spawn(watch_connectivity(
                Arc::clone(&controller),
                monitor,
                shutdown.subscribe(),
            )),
        ];
        info!("session started");

        Session {
            controller,
            shutdown,
            tasks,
        }
    }

    pub fn controller(&self) -> &Arc<SyncController<R>> {
        &self.controller
    }

    /// Stop both watchers and wait for them to release their handles.
    pub async fn teardown(self) -> Arc<SyncController<R>> {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                debug!(error = %e, "watcher task ended abnormally");
            }
        }
        info!("session stopped");
        self.controller
    }

    /// Tear down and clear all session state, pending actions included.
    pub async fn logout(self) {
        let controller = self.teardown().await;
        controller.reset().await;
    }
}

async fn watch_subscription<R: RemoteStore>(
    controller: Arc<SyncController<R>>,
    backoff: Backoff,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut delay = backoff.initial;
    let mut subscription = loop {
        tokio::select! {
            _ = shutdown.changed() => return,
            result = controller.remote().subscribe() => match result {
                Ok(subscription) => break subscription,
                Err(e) => controller.subscription_failed(&e),
            },
        }
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = backoff.next(delay);
    };

    controller.set_watcher(WatcherState::Watching).await;
    debug!("watching users collection");

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = subscription.next() => match event {
                Some(SubscriptionEvent::Snapshot(records)) => controller.apply_snapshot(records).await,
                Some(SubscriptionEvent::Error(e)) => controller.subscription_failed(&e),
                None => break,
            },
        }
    }

    subscription.close();
    controller.set_watcher(WatcherState::Idle).await;
    debug!("users subscription released");
}

async fn watch_connectivity<R: RemoteStore>(
    controller: Arc<SyncController<R>>,
    mut monitor: ConnectivityMonitor,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            transition = monitor.next_transition() => match transition {
                Some(transition) => {
                    controller
                        .on_connectivity(transition.to == Connectivity::Connected)
                        .await;
                }
                None => break,
            },
        }
    }
    monitor.stop();
    debug!("connectivity listener released");
}
