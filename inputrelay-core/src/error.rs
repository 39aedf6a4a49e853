// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for InputRelay.
//!
//! This module defines explicit enum error types as per coding guidelines.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the input relay.
/// All errors are explicit variants - no catch-all or generic handling.
#[derive(Debug, Error)]
pub enum RelayError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Shared Region Errors - Fatal at startup, never per call
    // =========================================================================
    #[error("Shared region error: {0}")]
    Region(#[from] RegionError),

    // =========================================================================
    // Guard Errors
    // =========================================================================
    #[error("Input guard error: {0}")]
    Lock(#[from] LockError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors cause immediate process termination.
/// Used when configuration is invalid and the relay cannot safely start.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid region name '{name}': {reason}")]
    InvalidRegionName { name: String, reason: String },
}

/// Shared region errors - the relay cannot run without its region.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("Invalid region name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid region size {size}: {reason}")]
    InvalidSize { size: usize, reason: String },

    #[error("Region '{name}' already exists with size {actual}, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Region '{name}' payload layout is {actual} bytes, expected {expected}")]
    LayoutMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("OS resource limit reached opening region '{name}': {reason}")]
    ResourceExhausted { name: String, reason: String },

    #[error("Failed to open shared region '{name}': {reason}")]
    OpenFailed { name: String, reason: String },

    #[error("Failed to map shared region: {reason}")]
    MapFailed { reason: String },

    #[error("Region '{name}' was not initialized by its creator within {waited_ms}ms")]
    NotInitialized { name: String, waited_ms: u64 },

    #[error("Failed to initialize region '{name}': {reason}")]
    InitFailed { name: String, reason: String },

    #[error("Failed to unlink shared region '{name}': {reason}")]
    UnlinkFailed { name: String, reason: String },
}

/// Errors from the embedded cross-process mutex.
///
/// `AcquireTimeout` is an expected outcome of a bounded wait, not a failure:
/// callers turn it into "operation not applied".
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Input guard not acquired within {waited_ms}ms")]
    AcquireTimeout { waited_ms: u64 },

    #[error("Input guard is already held by the calling thread")]
    WouldDeadlock,

    #[error("Input guard is not recoverable after its owner died")]
    NotRecoverable,

    #[error("{call} failed: {reason}")]
    Syscall { call: &'static str, reason: String },
}

impl LockError {
    /// Whether the error only means the bounded wait ran out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::AcquireTimeout { .. })
    }
}

/// Arguments rejected at the boundary before any field is touched.
#[derive(Debug, Error)]
pub enum InvalidArgument {
    #[error("Key code {code} outside keyboard table (0..{len})")]
    KeyCodeOutOfRange { code: i64, len: usize },

    #[error("Mouse button index {index} outside button mask (0..{count})")]
    ButtonIndexOutOfRange { index: i64, count: u32 },
}

/// Result type alias using RelayError.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_error_display() {
        let err = RegionError::SizeMismatch {
            name: "CfxReverseGameData".to_string(),
            expected: 448,
            actual: 4096,
        };
        assert!(err.to_string().contains("CfxReverseGameData"));
        assert!(err.to_string().contains("448"));
    }

    #[test]
    fn test_error_chain() {
        let region_err = RegionError::MapFailed {
            reason: "ENOMEM".to_string(),
        };
        let relay_err: RelayError = region_err.into();
        assert!(matches!(relay_err, RelayError::Region(_)));

        let arg_err = InvalidArgument::KeyCodeOutOfRange { code: 300, len: 256 };
        let relay_err: RelayError = arg_err.into();
        assert!(matches!(relay_err, RelayError::InvalidArgument(_)));
    }

    #[test]
    fn test_timeout_is_not_a_failure() {
        assert!(LockError::AcquireTimeout { waited_ms: 10 }.is_timeout());
        assert!(!LockError::WouldDeadlock.is_timeout());
    }
}
