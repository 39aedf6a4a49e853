// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Consumer-side reads.

use serde::{Deserialize, Serialize};

use crate::relay::InputRelay;
use crate::shm::WaitPolicy;
use crate::types::FpsLimit;

/// Owned copy of the relay fields taken under the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Mouse motion accumulated since the last drain.
    pub mouse_dx: i32,
    pub mouse_dy: i32,
    pub mouse_wheel: i32,
    /// Button bitmask, bit `i` set while button `i` is down.
    pub mouse_buttons: u32,
    /// Key codes whose keyboard slot has the down bit set.
    pub pressed_keys: Vec<u8>,
    pub fps_limit: FpsLimit,
    pub input_char: Option<char>,
}

impl InputRelay {
    /// Copy all fields and reset the accumulated mouse delta.
    ///
    /// `None` when the guard could not be obtained under `policy`; nothing
    /// was read or reset in that case.
    pub fn drain(&self, policy: WaitPolicy) -> Option<InputSnapshot> {
        self.with_fields(policy, |fields| {
            let snapshot = fields.snapshot();
            fields.take_mouse_delta();
            snapshot
        })
    }

    /// Copy all fields without resetting anything.
    pub fn snapshot(&self, policy: WaitPolicy) -> Option<InputSnapshot> {
        self.with_fields(policy, |fields| fields.snapshot())
    }
}
