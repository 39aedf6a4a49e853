// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod input;
pub mod read;
pub mod unlink;
pub mod validate;
pub mod watch;

use inputrelay_core::{ConfigLoader, InputRelay, RegionName, RelayConfig, RelayError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Input guard not acquired within {waited_ms}ms")]
    GuardBusy { waited_ms: u64 },

    #[error("Failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Load the configuration file (or defaults) and apply the region override.
pub fn load_config(path: Option<&str>, region: Option<&str>) -> Result<RelayConfig, CliError> {
    let mut config = match path {
        Some(path) => ConfigLoader::load_file(path)?,
        None => RelayConfig::default(),
    };

    if let Some(region) = region {
        config.region_name = RegionName::new(region).map_err(RelayError::from)?;
    }

    Ok(config)
}

/// Attach to the configured region, creating it if needed.
pub fn open_relay(config: &RelayConfig) -> Result<InputRelay, CliError> {
    Ok(InputRelay::open(config)?)
}

/// Report whether a bounded-wait event made it into the region.
pub fn report(what: &str, applied: bool) {
    if applied {
        println!("✓ {} applied", what);
    } else {
        println!("✗ {} dropped (input guard busy)", what);
    }
}
