// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Input relay over a named shared region.
//!
//! A front-end process writes mouse, keyboard, FPS-cap and character input
//! into the region; a consumer process drains it. Both sides take the
//! embedded mutex for every access.

mod consumer;
mod frontend;
mod guard;
mod state;

use std::time::Duration;

pub use consumer::InputSnapshot;
pub use guard::InputGuard;
pub use state::{InputFields, InputRelayState, KEY_DOWN, KEY_UP};

use crate::config::RelayConfig;
use crate::error::{LockError, RelayResult};
use crate::shm::{SharedView, WaitPolicy};

/// Per-process handle to the input relay region.
///
/// Constructed once at startup and passed by reference to whatever needs
/// it. Dropping the handle unmaps the region but leaves it in place for
/// other processes.
pub struct InputRelay {
    view: SharedView<InputRelayState>,
    try_timeout: Duration,
}

impl InputRelay {
    /// Open the configured region, creating it if no process has yet.
    ///
    /// Region failures are fatal for the relay and should be surfaced at
    /// startup.
    pub fn open(config: &RelayConfig) -> RelayResult<Self> {
        let view = SharedView::<InputRelayState>::open_or_create(
            config.region_name.as_str(),
            config.init_timeout,
        )?;

        tracing::info!(
            region = %config.region_name,
            created = view.created(),
            try_timeout_ms = config.try_acquire_timeout.as_millis() as u64,
            "Input relay attached"
        );

        Ok(Self {
            view,
            try_timeout: config.try_acquire_timeout,
        })
    }

    /// Name of the region this handle is attached to.
    pub fn region_name(&self) -> &str {
        self.view.name()
    }

    /// Whether this process created the region.
    pub fn created(&self) -> bool {
        self.view.created()
    }

    /// Bound used by latency-sensitive operations.
    pub fn try_timeout(&self) -> Duration {
        self.try_timeout
    }

    /// Acquire the input guard according to `policy`.
    pub fn acquire(&self, policy: WaitPolicy) -> Result<InputGuard<'_>, LockError> {
        self.view.lock(policy)
    }

    /// Try to acquire the guard within `timeout`.
    ///
    /// `None` means nothing may be mutated; the caller reports a no-op.
    pub fn try_acquire(&self, timeout: Duration) -> Option<InputGuard<'_>> {
        self.guarded(WaitPolicy::Bounded(timeout))
    }

    /// Block until the guard is acquired.
    pub fn must_acquire(&self) -> Result<InputGuard<'_>, LockError> {
        self.acquire(WaitPolicy::Infinite)
    }

    /// Acquire with `policy`, logging why the guard was not obtained.
    fn guarded(&self, policy: WaitPolicy) -> Option<InputGuard<'_>> {
        match self.acquire(policy) {
            Ok(guard) => Some(guard),
            Err(e) if e.is_timeout() => {
                tracing::trace!(region = %self.region_name(), "Input guard busy, dropping event");
                None
            }
            Err(e) => {
                tracing::error!(region = %self.region_name(), error = %e, "Input guard unavailable");
                None
            }
        }
    }

    /// Run `op` on the fields under one guard; the guard is released
    /// before this returns, whatever `op` does.
    fn with_fields<R>(
        &self,
        policy: WaitPolicy,
        op: impl FnOnce(&mut InputFields) -> R,
    ) -> Option<R> {
        let mut guard = self.guarded(policy)?;
        Some(op(&mut guard))
    }
}
