// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! A `KeyCode` or `MouseButton` that exists is always a valid index into the
//! shared input state, so mutators never need to re-check bounds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HardValidationError, InvalidArgument};

/// Number of slots in the virtual-keyboard state table.
pub const KEYBOARD_STATE_LEN: usize = 256;

/// Number of addressable bits in the mouse button mask.
pub const MOUSE_BUTTON_COUNT: u32 = u32::BITS;

/// Longest accepted region name (POSIX NAME_MAX without the leading slash).
pub const MAX_REGION_NAME_LEN: usize = 254;

/// Region name shared by every cooperating front-end and consumer build.
pub const DEFAULT_REGION_NAME: &str = "CfxReverseGameData";

/// Check a shared region name, returning the rejection reason.
pub(crate) fn check_region_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Region name cannot be empty".to_string());
    }
    if name.len() > MAX_REGION_NAME_LEN {
        return Err(format!(
            "Region name too long: {} bytes (max {})",
            name.len(),
            MAX_REGION_NAME_LEN
        ));
    }
    if name.contains('/') || name.contains('\0') {
        return Err("Region name must not contain '/' or NUL".to_string());
    }
    Ok(())
}

/// Validated shared region name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionName(String);

impl RegionName {
    /// Create a new RegionName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();
        match check_region_name(&name) {
            Ok(()) => Ok(Self(name)),
            Err(reason) => Err(HardValidationError::InvalidRegionName { name, reason }),
        }
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RegionName {
    fn default() -> Self {
        Self(DEFAULT_REGION_NAME.to_string())
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RegionName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionName> for String {
    fn from(name: RegionName) -> Self {
        name.0
    }
}

/// Virtual key code, guaranteed to index the keyboard state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(u8);

impl KeyCode {
    /// Create a KeyCode, rejecting codes outside the fixed table.
    pub fn new(code: i64) -> Result<Self, InvalidArgument> {
        u8::try_from(code)
            .map(Self)
            .map_err(|_| InvalidArgument::KeyCodeOutOfRange {
                code,
                len: KEYBOARD_STATE_LEN,
            })
    }

    /// Get the table index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for KeyCode {
    fn from(code: u8) -> Self {
        Self(code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Mouse button index, guaranteed to address a bit of the button mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton(u8);

impl MouseButton {
    /// Create a MouseButton, rejecting indices past the mask width.
    pub fn new(index: i64) -> Result<Self, InvalidArgument> {
        if !(0..MOUSE_BUTTON_COUNT as i64).contains(&index) {
            return Err(InvalidArgument::ButtonIndexOutOfRange {
                index,
                count: MOUSE_BUTTON_COUNT,
            });
        }
        Ok(Self(index as u8))
    }

    /// Bit of this button inside the mask.
    pub fn mask(&self) -> u32 {
        1 << self.0
    }

    /// Get the button index.
    pub fn index(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame-rate cap. Zero means no cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct FpsLimit(i32);

impl FpsLimit {
    /// No frame-rate cap.
    pub const UNCAPPED: Self = Self(0);

    /// Normalize a loosely typed number into a cap.
    ///
    /// Integral values in `i32` range are kept; anything else (absent,
    /// fractional, non-finite, out of range) means no cap. Negative caps
    /// are meaningless and clamp to zero.
    pub fn normalize(value: Option<f64>) -> Self {
        match value {
            Some(v)
                if v.is_finite()
                    && v.fract() == 0.0
                    && v >= i32::MIN as f64
                    && v <= i32::MAX as f64 =>
            {
                Self::from(v as i32)
            }
            _ => Self::UNCAPPED,
        }
    }

    /// Get the cap in frames per second.
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Whether a cap is in effect.
    pub fn is_capped(&self) -> bool {
        self.0 > 0
    }
}

impl From<i32> for FpsLimit {
    fn from(value: i32) -> Self {
        Self(value.max(0))
    }
}

impl From<FpsLimit> for i32 {
    fn from(limit: FpsLimit) -> Self {
        limit.0
    }
}

impl fmt::Display for FpsLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_capped() {
            write!(f, "{} fps", self.0)
        } else {
            write!(f, "uncapped")
        }
    }
}
