// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fixed layout of the input relay region.
//!
//! The byte layout of [`InputRelayState`] is the contract between every
//! process that opens the region. There is no version tag: changing a field
//! requires rebuilding all participants together.

use std::cell::UnsafeCell;

use crate::error::LockError;
use crate::relay::{InputGuard, InputSnapshot};
use crate::shm::{RegionLayout, SharedMutex, WaitPolicy};
use crate::types::{FpsLimit, KeyCode, MouseButton, KEYBOARD_STATE_LEN};

/// Keyboard slot value for a pressed key.
pub const KEY_DOWN: u8 = 0x80;

/// Keyboard slot value for a released key.
pub const KEY_UP: u8 = 0;

/// Input fields guarded by the region mutex.
///
/// Only reachable through an [`InputGuard`], so every read and write happens
/// with the mutex held.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFields {
    mouse_x: i32,
    mouse_y: i32,
    mouse_wheel: i32,
    mouse_buttons: u32,
    keyboard_state: [u8; KEYBOARD_STATE_LEN],
    fps_limit: i32,
    input_char: u32,
}

impl InputFields {
    /// All fields cleared: no motion, nothing pressed, no cap, no character.
    pub const EMPTY: Self = Self {
        mouse_x: 0,
        mouse_y: 0,
        mouse_wheel: 0,
        mouse_buttons: 0,
        keyboard_state: [KEY_UP; KEYBOARD_STATE_LEN],
        fps_limit: 0,
        input_char: 0,
    };

    /// Add a relative motion to the pending mouse delta.
    ///
    /// Deltas accumulate until a consumer drains them; saturates at the
    /// `i32` bounds.
    pub fn accumulate_mouse_delta(&mut self, dx: i32, dy: i32) {
        self.mouse_x = self.mouse_x.saturating_add(dx);
        self.mouse_y = self.mouse_y.saturating_add(dy);
    }

    pub fn set_key_state(&mut self, key: KeyCode, down: bool) {
        self.keyboard_state[key.index()] = if down { KEY_DOWN } else { KEY_UP };
    }

    /// Set or clear exactly one bit of the button mask.
    pub fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        if down {
            self.mouse_buttons |= button.mask();
        } else {
            self.mouse_buttons &= !button.mask();
        }
    }

    pub fn set_mouse_wheel(&mut self, value: i32) {
        self.mouse_wheel = value;
    }

    pub fn set_fps_limit(&mut self, limit: FpsLimit) {
        self.fps_limit = limit.value();
    }

    /// Store the first character of `text` as the pending character.
    ///
    /// Returns false (and writes nothing) for empty text.
    pub fn set_input_char(&mut self, text: &str) -> bool {
        match text.chars().next() {
            Some(ch) => {
                self.input_char = ch as u32;
                true
            }
            None => false,
        }
    }

    /// Pending mouse delta.
    pub fn mouse_delta(&self) -> (i32, i32) {
        (self.mouse_x, self.mouse_y)
    }

    /// Return the pending mouse delta and reset it to zero.
    pub fn take_mouse_delta(&mut self) -> (i32, i32) {
        let delta = self.mouse_delta();
        self.mouse_x = 0;
        self.mouse_y = 0;
        delta
    }

    pub fn mouse_wheel(&self) -> i32 {
        self.mouse_wheel
    }

    pub fn mouse_buttons(&self) -> u32 {
        self.mouse_buttons
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons & button.mask() != 0
    }

    /// Raw keyboard slot for `key` (`KEY_DOWN` or `KEY_UP`).
    pub fn key_state(&self, key: KeyCode) -> u8 {
        self.keyboard_state[key.index()]
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.key_state(key) & KEY_DOWN != 0
    }

    pub fn keyboard_state(&self) -> &[u8; KEYBOARD_STATE_LEN] {
        &self.keyboard_state
    }

    pub fn fps_limit(&self) -> FpsLimit {
        FpsLimit::from(self.fps_limit)
    }

    /// Pending typed character, if any.
    pub fn input_char(&self) -> Option<char> {
        match self.input_char {
            0 => None,
            code => char::from_u32(code),
        }
    }

    /// Copy every field into an owned snapshot.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            mouse_dx: self.mouse_x,
            mouse_dy: self.mouse_y,
            mouse_wheel: self.mouse_wheel,
            mouse_buttons: self.mouse_buttons,
            pressed_keys: (0..KEYBOARD_STATE_LEN)
                .filter(|&code| self.keyboard_state[code] & KEY_DOWN != 0)
                .map(|code| code as u8)
                .collect(),
            fps_limit: self.fps_limit(),
            input_char: self.input_char(),
        }
    }
}

impl Default for InputFields {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Everything stored in the input relay region.
#[repr(C)]
pub struct InputRelayState {
    input_mutex: SharedMutex,
    fields: UnsafeCell<InputFields>,
}

// SAFETY: `fields` is only accessed through an InputGuard, which holds
// `input_mutex` for its whole lifetime.
unsafe impl Sync for InputRelayState {}

// SAFETY: repr(C), no pointers; the mutex is initialised in place and the
// zeroed fields equal InputFields::EMPTY.
unsafe impl RegionLayout for InputRelayState {
    unsafe fn initialize(this: *mut Self) -> Result<(), String> {
        SharedMutex::init_in_place(std::ptr::addr_of_mut!((*this).input_mutex))
            .map_err(|e| e.to_string())?;
        std::ptr::addr_of_mut!((*this).fields).write(UnsafeCell::new(InputFields::EMPTY));
        Ok(())
    }
}

impl InputRelayState {
    /// Acquire the input mutex and return a guard over the fields.
    pub fn lock(&self, policy: WaitPolicy) -> Result<InputGuard<'_>, LockError> {
        let lock = self.input_mutex.lock(policy)?;
        Ok(InputGuard::new(lock, &self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: i64) -> KeyCode {
        KeyCode::new(code).unwrap()
    }

    fn button(index: i64) -> MouseButton {
        MouseButton::new(index).unwrap()
    }

    #[test]
    fn test_mouse_delta_sums() {
        let mut fields = InputFields::EMPTY;
        let deltas = [(3, -2), (1, 1), (-7, 4), (0, 0), (12, -30)];
        for (dx, dy) in deltas {
            fields.accumulate_mouse_delta(dx, dy);
        }
        let expected = deltas
            .iter()
            .fold((0, 0), |(x, y), (dx, dy)| (x + dx, y + dy));
        assert_eq!(fields.mouse_delta(), expected);
    }

    #[test]
    fn test_mouse_delta_saturates() {
        let mut fields = InputFields::EMPTY;
        fields.accumulate_mouse_delta(i32::MAX, i32::MIN);
        fields.accumulate_mouse_delta(5, -5);
        assert_eq!(fields.mouse_delta(), (i32::MAX, i32::MIN));
    }

    #[test]
    fn test_take_mouse_delta_resets() {
        let mut fields = InputFields::EMPTY;
        fields.accumulate_mouse_delta(4, -1);
        assert_eq!(fields.take_mouse_delta(), (4, -1));
        assert_eq!(fields.mouse_delta(), (0, 0));
    }

    #[test]
    fn test_key_state_last_write_wins() {
        let mut fields = InputFields::EMPTY;
        fields.set_key_state(key(0x41), true);
        fields.set_key_state(key(0x41), false);
        assert_eq!(fields.key_state(key(0x41)), 0);

        fields.set_key_state(key(0x41), false);
        fields.set_key_state(key(0x41), true);
        assert_eq!(fields.key_state(key(0x41)), 0x80);

        // Neighbouring slots untouched
        assert_eq!(fields.key_state(key(0x40)), 0);
        assert_eq!(fields.key_state(key(0x42)), 0);
    }

    #[test]
    fn test_mouse_button_touches_one_bit() {
        for index in 0..32 {
            let mut fields = InputFields::EMPTY;
            fields.mouse_buttons = 0xA5A5_5A5A;
            let before = fields.mouse_buttons();

            fields.set_mouse_button(button(index), true);
            assert_eq!(fields.mouse_buttons(), before | (1 << index));

            fields.set_mouse_button(button(index), false);
            assert_eq!(fields.mouse_buttons(), before & !(1 << index));
        }
    }

    #[test]
    fn test_wheel_and_fps_overwrite() {
        let mut fields = InputFields::EMPTY;
        fields.set_mouse_wheel(120);
        fields.set_mouse_wheel(-120);
        assert_eq!(fields.mouse_wheel(), -120);

        fields.set_fps_limit(FpsLimit::from(60));
        fields.set_fps_limit(FpsLimit::from(30));
        assert_eq!(fields.fps_limit().value(), 30);
    }

    #[test]
    fn test_input_char() {
        let mut fields = InputFields::EMPTY;
        assert_eq!(fields.input_char(), None);

        assert!(fields.set_input_char("hello"));
        assert_eq!(fields.input_char(), Some('h'));

        assert!(!fields.set_input_char(""));
        assert_eq!(fields.input_char(), Some('h'));

        assert!(fields.set_input_char("ü"));
        assert_eq!(fields.input_char(), Some('ü'));
    }

    #[test]
    fn test_snapshot_lists_pressed_keys() {
        let mut fields = InputFields::EMPTY;
        fields.set_key_state(key(0x10), true);
        fields.set_key_state(key(0xFF), true);
        fields.set_key_state(key(0x20), true);
        fields.set_key_state(key(0x20), false);

        let snapshot = fields.snapshot();
        assert_eq!(snapshot.pressed_keys, vec![0x10, 0xFF]);
        assert_eq!(snapshot.fps_limit, FpsLimit::UNCAPPED);
    }

    #[test]
    fn test_zeroed_memory_is_empty() {
        // SAFETY: InputFields is plain integers
        let zeroed: InputFields = unsafe { std::mem::zeroed() };
        assert_eq!(zeroed, InputFields::EMPTY);
    }
}
