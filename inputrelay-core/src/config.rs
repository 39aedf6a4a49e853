// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validates relay settings at startup.
//! Any invalid field results in a HardValidationError that prevents startup.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HardValidationError, RelayError, RelayResult};
use crate::types::{RegionName, DEFAULT_REGION_NAME};

/// Upper bound for the bounded-wait policy.
const MAX_TRY_ACQUIRE_TIMEOUT_MS: u64 = 1000;

/// Upper bound for waiting on another process to initialise the region.
const MAX_INIT_TIMEOUT_MS: u64 = 60_000;

/// Raw relay configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelayConfig {
    #[serde(default = "default_region_name")]
    region_name: String,
    #[serde(default = "default_try_acquire_timeout_ms")]
    try_acquire_timeout_ms: u64,
    #[serde(default = "default_init_timeout_ms")]
    init_timeout_ms: u64,
}

fn default_region_name() -> String {
    DEFAULT_REGION_NAME.to_string()
}

fn default_try_acquire_timeout_ms() -> u64 {
    10 // Per-frame input must never stall on a contended guard
}

fn default_init_timeout_ms() -> u64 {
    1000
}

impl Default for RawRelayConfig {
    fn default() -> Self {
        Self {
            region_name: default_region_name(),
            try_acquire_timeout_ms: default_try_acquire_timeout_ms(),
            init_timeout_ms: default_init_timeout_ms(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    relay: RawRelayConfig,
}

/// Validated relay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Name every cooperating process opens.
    pub region_name: RegionName,
    /// Bound for latency-sensitive acquisitions (mouse motion, wheel).
    pub try_acquire_timeout: Duration,
    /// How long an opener waits for the creator to initialise the region.
    pub init_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            region_name: RegionName::default(),
            try_acquire_timeout: Duration::from_millis(default_try_acquire_timeout_ms()),
            init_timeout: Duration::from_millis(default_init_timeout_ms()),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    /// Returns HardValidationError for any invalid fields.
    pub fn load_file(path: impl AsRef<Path>) -> RelayResult<RelayConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RelayError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RelayError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> RelayResult<RelayConfig> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Self::validate(RawConfig {
                relay: RawRelayConfig::default(),
            });
        }

        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| RelayError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> RelayResult<RelayConfig> {
        let raw = raw.relay;

        let region_name = RegionName::new(raw.region_name)?;

        if raw.try_acquire_timeout_ms > MAX_TRY_ACQUIRE_TIMEOUT_MS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "try_acquire_timeout_ms",
                value: raw.try_acquire_timeout_ms.to_string(),
                reason: format!(
                    "Must not exceed {}ms; input events must not stall",
                    MAX_TRY_ACQUIRE_TIMEOUT_MS
                ),
            }
            .into());
        }

        if raw.init_timeout_ms == 0 || raw.init_timeout_ms > MAX_INIT_TIMEOUT_MS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "init_timeout_ms",
                value: raw.init_timeout_ms.to_string(),
                reason: format!("Must be between 1 and {}ms", MAX_INIT_TIMEOUT_MS),
            }
            .into());
        }

        Ok(RelayConfig {
            region_name,
            try_acquire_timeout: Duration::from_millis(raw.try_acquire_timeout_ms),
            init_timeout: Duration::from_millis(raw.init_timeout_ms),
        })
    }
}
