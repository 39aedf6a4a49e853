// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Typed view over a [`SharedRegion`].
//!
//! The region starts with a small header used for the creation handshake:
//! the creating process initialises the payload in place and then publishes
//! `READY`; every other process waits for that before touching the payload.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use crate::error::RegionError;
use crate::shm::SharedRegion;

/// Header states. A fresh region is zero-filled, i.e. `UNINITIALIZED`.
const UNINITIALIZED: u32 = 0;
const READY: u32 = 1;
const INIT_FAILED: u32 = 2;

/// Poll interval while waiting for the creator to publish `READY`.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Region header placed before the payload.
#[repr(C, align(64))]
struct RegionHeader {
    init_state: AtomicU32,
    payload_size: AtomicU32,
}

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<RegionHeader>();

/// Types that can be placed in a shared region.
///
/// # Safety
/// Implementors must be `#[repr(C)]`, contain no pointers or references,
/// be valid after [`RegionLayout::initialize`] runs over zeroed memory, and
/// mediate all shared mutation through interior synchronisation.
pub unsafe trait RegionLayout: Sync {
    /// Initialise the payload in place, once, in the creating process.
    ///
    /// # Safety
    /// `this` points to zeroed, mapped memory that no other process can
    /// observe as initialised yet.
    unsafe fn initialize(this: *mut Self) -> Result<(), String>;
}

/// Typed, shared handle to a named region holding a `T`.
pub struct SharedView<T: RegionLayout> {
    region: SharedRegion,
    _layout: PhantomData<T>,
}

// SAFETY: T: Sync guards its own contents; the region owns the mapping
unsafe impl<T: RegionLayout> Send for SharedView<T> {}
unsafe impl<T: RegionLayout> Sync for SharedView<T> {}

impl<T: RegionLayout> SharedView<T> {
    /// Total mapped size for this layout.
    pub const REGION_SIZE: usize = HEADER_SIZE + std::mem::size_of::<T>();

    /// Open the named region, creating and initialising it if absent.
    ///
    /// `init_wait` bounds how long an opener waits for the creator to
    /// finish initialising.
    pub fn open_or_create(name: &str, init_wait: Duration) -> Result<Self, RegionError> {
        const {
            assert!(std::mem::align_of::<T>() <= std::mem::align_of::<RegionHeader>());
        }

        let region = SharedRegion::open_or_create(name, Self::REGION_SIZE, init_wait)?;
        let view = Self {
            region,
            _layout: PhantomData,
        };

        if view.region.created() {
            view.initialize()?;
        } else {
            view.wait_ready(init_wait)?;
        }

        Ok(view)
    }

    fn header(&self) -> &RegionHeader {
        // SAFETY: the mapping starts with a RegionHeader-sized, aligned block
        // made of atomics, valid for any bit pattern
        unsafe { &*(self.region.as_ptr() as *const RegionHeader) }
    }

    fn payload_ptr(&self) -> *mut T {
        // SAFETY: HEADER_SIZE is within the mapping; header alignment
        // covers T's alignment
        unsafe { self.region.as_ptr().add(HEADER_SIZE) as *mut T }
    }

    fn initialize(&self) -> Result<(), RegionError> {
        let header = self.header();

        // SAFETY: we created the region, it is zero-filled and nobody
        // reads the payload before READY is published
        if let Err(reason) = unsafe { T::initialize(self.payload_ptr()) } {
            header.init_state.store(INIT_FAILED, Ordering::Release);
            // Let the next process start over from a fresh region
            if let Err(e) = SharedRegion::unlink(self.region.name()) {
                tracing::warn!(error = %e, "Failed to remove uninitialized region");
            }
            return Err(RegionError::InitFailed {
                name: self.region.name().to_string(),
                reason,
            });
        }

        header
            .payload_size
            .store(std::mem::size_of::<T>() as u32, Ordering::Relaxed);
        header.init_state.store(READY, Ordering::Release);

        tracing::debug!(name = %self.region.name(), "Initialized shared region layout");
        Ok(())
    }

    fn wait_ready(&self, wait: Duration) -> Result<(), RegionError> {
        let header = self.header();
        let start = Instant::now();

        loop {
            match header.init_state.load(Ordering::Acquire) {
                READY => break,
                UNINITIALIZED if start.elapsed() < wait => {
                    std::thread::sleep(READY_POLL_INTERVAL)
                }
                INIT_FAILED => {
                    return Err(RegionError::InitFailed {
                        name: self.region.name().to_string(),
                        reason: "creator failed to initialize the region".to_string(),
                    })
                }
                _ => {
                    return Err(RegionError::NotInitialized {
                        name: self.region.name().to_string(),
                        waited_ms: wait.as_millis() as u64,
                    })
                }
            }
        }

        let actual = header.payload_size.load(Ordering::Relaxed) as usize;
        if actual != std::mem::size_of::<T>() {
            return Err(RegionError::LayoutMismatch {
                name: self.region.name().to_string(),
                expected: std::mem::size_of::<T>(),
                actual,
            });
        }

        Ok(())
    }

    /// Get the name of the underlying region.
    pub fn name(&self) -> &str {
        self.region.name()
    }

    /// Whether this handle created the region.
    pub fn created(&self) -> bool {
        self.region.created()
    }
}

impl<T: RegionLayout> Deref for SharedView<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the payload was initialised (by us or a READY creator)
        // and lives as long as the mapping
        unsafe { &*self.payload_ptr() }
    }
}
