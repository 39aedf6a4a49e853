// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! InputRelay Benchmarking Support
//!
//! Helpers shared by the criterion benchmarks: private regions that do not
//! collide with a running relay and are removed afterwards.

use inputrelay_core::{InputRelay, RegionName, RelayConfig, RelayResult, SharedRegion};

/// A relay attached to a region private to one benchmark.
pub struct BenchRegion {
    config: RelayConfig,
}

impl BenchRegion {
    /// Create a configuration for a region unique to this process and `tag`.
    pub fn new(tag: &str) -> RelayResult<Self> {
        let name = RegionName::new(format!("inputrelay-bench-{}-{}", tag, std::process::id()))?;
        Ok(Self {
            config: RelayConfig {
                region_name: name,
                ..RelayConfig::default()
            },
        })
    }

    /// Attach another handle (a separate "process") to the region.
    pub fn open(&self) -> RelayResult<InputRelay> {
        InputRelay::open(&self.config)
    }
}

impl Drop for BenchRegion {
    fn drop(&mut self) {
        let _ = SharedRegion::unlink(self.config.region_name.as_str());
    }
}
