// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::config::Config;
use crate::display::format_signal;
use crate::error::Result;
use crate::sync::Session;

use super::open_controller;

/// Run a full session until Ctrl-C, printing every signal.
pub async fn run(config: &Config) -> Result<()> {
    let controller = Arc::new(open_controller(config)?);
    let probe = config.probe()?;
    let mut signals = controller.signals();

    let session = Session::start(Arc::clone(&controller), &probe, config.remote.backoff());
    let seed = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.fetch_seed().await })
    };
    println!("watching {} (Ctrl-C to stop)", config.remote.url);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            signal = signals.recv() => match signal {
                Ok(signal) => println!("{}", format_signal(&signal)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "signal output fell behind"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    seed.abort();
    session.teardown().await;
    Ok(())
}
