// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! InputRelay Core Library
//!
//! Low-latency input relay between a front-end process and a consumer
//! process. Provides the named shared-memory region, the embedded
//! cross-process mutex, the fixed-layout input state, guarded field
//! mutators and configuration parsing.

pub mod config;
pub mod error;
pub mod relay;
pub mod shm;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigLoader, RelayConfig};
pub use error::{
    HardValidationError, InvalidArgument, LockError, RegionError, RelayError, RelayResult,
};
pub use relay::{InputFields, InputGuard, InputRelay, InputRelayState, InputSnapshot};
pub use shm::{SharedMutex, SharedRegion, SharedView, WaitPolicy};
pub use types::{FpsLimit, KeyCode, MouseButton, RegionName};
