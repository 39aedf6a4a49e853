// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Front-end commands - write input into the relay.

use inputrelay_core::{KeyCode, MouseButton, RelayConfig};

use super::{open_relay, report, CliError};
use crate::Press;

/// `relay mouse <dx> <dy>`
pub async fn mouse(config: &RelayConfig, dx: i32, dy: i32) -> Result<(), CliError> {
    let relay = open_relay(config)?;
    tracing::debug!(dx, dy, "Sending mouse motion");
    report(&format!("mouse ({}, {})", dx, dy), relay.send_mouse_pos(dx, dy));
    Ok(())
}

/// `relay wheel <value>`
pub async fn wheel(config: &RelayConfig, value: i32) -> Result<(), CliError> {
    let relay = open_relay(config)?;
    report(&format!("wheel {}", value), relay.send_mouse_wheel(value));
    Ok(())
}

/// `relay key <code> <down|up>`
pub async fn key(config: &RelayConfig, code: i32, state: Press) -> Result<(), CliError> {
    if let Err(e) = KeyCode::new(code.into()) {
        println!("✗ key {} rejected: {}", code, e);
        return Ok(());
    }

    let relay = open_relay(config)?;
    if relay.set_key_state(code, state.is_down()) {
        println!("✓ key {:#04x} {:?}", code, state);
    } else {
        println!("✗ key {} not applied (input guard unavailable)", code);
    }
    Ok(())
}

/// `relay button <index> <down|up>`
pub async fn button(config: &RelayConfig, index: i32, state: Press) -> Result<(), CliError> {
    if let Err(e) = MouseButton::new(index.into()) {
        println!("✗ button {} rejected: {}", index, e);
        return Ok(());
    }

    let relay = open_relay(config)?;
    if relay.set_mouse_button_state(index, state.is_down()) {
        println!("✓ button {} {:?}", index, state);
    } else {
        println!("✗ button {} not applied (input guard unavailable)", index);
    }
    Ok(())
}

/// `relay fps [value]`
pub async fn fps(config: &RelayConfig, value: Option<&str>) -> Result<(), CliError> {
    let relay = open_relay(config)?;
    let parsed = value.and_then(|text| text.trim().parse::<f64>().ok());
    match relay.set_fps_limit(parsed) {
        Some(limit) => println!("✓ FPS limit: {}", limit),
        None => println!("✗ FPS limit not applied (input guard unavailable)"),
    }
    Ok(())
}

/// `relay char <text>`
pub async fn input_char(config: &RelayConfig, text: &str) -> Result<(), CliError> {
    let relay = open_relay(config)?;
    relay.set_input_char(text);
    match text.chars().next() {
        Some(ch) => println!("✓ input char {:?}", ch),
        None => println!("✗ empty text, nothing written"),
    }
    Ok(())
}
