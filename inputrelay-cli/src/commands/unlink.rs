// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `relay unlink` command - Remove the shared region name.
//!
//! Processes already attached keep their mapping; the next process to
//! start creates a fresh, zeroed region.

use inputrelay_core::{RelayConfig, RelayError, SharedRegion};

use super::CliError;

pub async fn execute(config: &RelayConfig) -> Result<(), CliError> {
    let name = config.region_name.as_str();
    SharedRegion::unlink(name).map_err(RelayError::from)?;
    println!("✓ Removed shared region '{}'", name);
    Ok(())
}
