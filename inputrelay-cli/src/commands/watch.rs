// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `relay watch` command - Drain the relay on an interval until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use inputrelay_core::{InputSnapshot, RelayConfig, WaitPolicy};
use tokio::time::{interval, MissedTickBehavior};

use super::{open_relay, CliError};
use crate::commands::read::print_snapshot;

pub async fn execute(config: &RelayConfig, interval_ms: u64, json: bool) -> Result<(), CliError> {
    let relay = Arc::new(open_relay(config)?);
    let policy = WaitPolicy::Bounded(relay.try_timeout());

    let mut ticker = interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        region = %relay.region_name(),
        interval_ms = interval_ms,
        "Watching input relay (Ctrl-C to stop)"
    );

    let mut last: Option<InputSnapshot> = None;
    let mut drains: u64 = 0;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                tracing::info!(drains = drains, "Stopped watching");
                return Ok(());
            }
        }

        // The guard is a blocking primitive; keep it off the async workers
        let drained = {
            let relay = Arc::clone(&relay);
            tokio::task::spawn_blocking(move || relay.drain(policy)).await?
        };

        let Some(snapshot) = drained else {
            continue;
        };
        drains += 1;

        if last.as_ref() == Some(&snapshot) {
            continue;
        }

        if json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            print_snapshot(relay.region_name(), &snapshot);
        }
        last = Some(snapshot);
    }
}
