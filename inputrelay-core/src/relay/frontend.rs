// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Front-end operations.
//!
//! Motion and wheel events use a bounded wait and are dropped when the
//! guard is contended. Discrete state changes (keys, buttons, FPS cap,
//! typed character) wait for the guard so they are never lost.

use crate::relay::InputRelay;
use crate::shm::WaitPolicy;
use crate::types::{FpsLimit, KeyCode, MouseButton};

impl InputRelay {
    fn input_event_policy(&self) -> WaitPolicy {
        WaitPolicy::Bounded(self.try_timeout)
    }

    /// Add a relative mouse motion. Returns whether it was applied.
    pub fn send_mouse_pos(&self, dx: i32, dy: i32) -> bool {
        self.with_fields(self.input_event_policy(), |fields| {
            fields.accumulate_mouse_delta(dx, dy)
        })
        .is_some()
    }

    /// Replace the wheel value. Returns whether it was applied.
    pub fn send_mouse_wheel(&self, value: i32) -> bool {
        self.with_fields(self.input_event_policy(), |fields| {
            fields.set_mouse_wheel(value)
        })
        .is_some()
    }

    /// Record a key press or release.
    ///
    /// Returns false without touching the region when `code` is outside
    /// the keyboard table.
    pub fn set_key_state(&self, code: i32, down: bool) -> bool {
        let key = match KeyCode::new(code.into()) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected key state update");
                return false;
            }
        };

        self.with_fields(WaitPolicy::Infinite, |fields| fields.set_key_state(key, down))
            .is_some()
    }

    /// Press or release one mouse button.
    ///
    /// Returns false without touching the region when `index` does not
    /// address a bit of the button mask.
    pub fn set_mouse_button_state(&self, index: i32, down: bool) -> bool {
        let button = match MouseButton::new(index.into()) {
            Ok(button) => button,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected mouse button update");
                return false;
            }
        };

        self.with_fields(WaitPolicy::Infinite, |fields| {
            fields.set_mouse_button(button, down)
        })
        .is_some()
    }

    /// Set the frame-rate cap; absent or non-integral values mean no cap.
    ///
    /// Returns the stored limit, or `None` if the guard could not be taken.
    pub fn set_fps_limit(&self, value: Option<f64>) -> Option<FpsLimit> {
        let limit = FpsLimit::normalize(value);
        self.with_fields(WaitPolicy::Infinite, |fields| fields.set_fps_limit(limit))?;
        tracing::debug!(limit = %limit, "FPS limit updated");
        Some(limit)
    }

    /// Publish the first character of `text` as the pending character.
    /// Empty text changes nothing.
    pub fn set_input_char(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.with_fields(WaitPolicy::Infinite, |fields| fields.set_input_char(text));
    }
}
