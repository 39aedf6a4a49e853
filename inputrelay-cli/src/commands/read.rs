// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `relay drain` / `relay snapshot` commands - Read the relay as a consumer.

use std::time::Duration;

use inputrelay_core::{InputSnapshot, RelayConfig, WaitPolicy};

use super::{open_relay, CliError};

/// One-shot reads wait this long before giving up on a busy guard.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn execute(config: &RelayConfig, drain: bool, json: bool) -> Result<(), CliError> {
    let relay = open_relay(config)?;
    let policy = WaitPolicy::Bounded(READ_TIMEOUT);

    let snapshot = if drain {
        relay.drain(policy)
    } else {
        relay.snapshot(policy)
    }
    .ok_or(CliError::GuardBusy {
        waited_ms: READ_TIMEOUT.as_millis() as u64,
    })?;

    if json {
        println!("{}", serde_json::to_string(&snapshot)?);
    } else {
        print_snapshot(relay.region_name(), &snapshot);
    }

    Ok(())
}

/// Human-readable rendering of a snapshot.
pub fn print_snapshot(region: &str, snapshot: &InputSnapshot) {
    println!("Region: {}", region);
    println!(
        "  Mouse delta:   ({}, {})",
        snapshot.mouse_dx, snapshot.mouse_dy
    );
    println!("  Mouse wheel:   {}", snapshot.mouse_wheel);
    println!("  Mouse buttons: {:#034b}", snapshot.mouse_buttons);
    if snapshot.pressed_keys.is_empty() {
        println!("  Keys down:     none");
    } else {
        let keys: Vec<String> = snapshot
            .pressed_keys
            .iter()
            .map(|code| format!("{:#04x}", code))
            .collect();
        println!("  Keys down:     {}", keys.join(" "));
    }
    println!("  FPS limit:     {}", snapshot.fps_limit);
    match snapshot.input_char {
        Some(ch) => println!("  Input char:    {:?}", ch),
        None => println!("  Input char:    none"),
    }
}
