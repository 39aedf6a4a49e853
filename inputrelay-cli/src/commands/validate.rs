// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `relay validate` command - Validate configuration file.

use inputrelay_core::ConfigLoader;

use super::CliError;

pub async fn execute(file: &str) -> Result<(), CliError> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Relay Settings:");
            println!("  Region Name:        {}", config.region_name);
            println!(
                "  Try-Acquire Bound:  {}ms",
                config.try_acquire_timeout.as_millis()
            );
            println!("  Init Timeout:       {}ms", config.init_timeout.as_millis());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
