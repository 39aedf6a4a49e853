// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Access guard over the shared input fields.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

use crate::relay::InputFields;
use crate::shm::SharedMutexGuard;

/// Held input mutex plus access to the fields it protects.
///
/// Field access is tied to the guard's lifetime, so nothing reaches the
/// shared fields without the mutex. Dropping the guard releases the mutex.
#[must_use = "the input guard is released as soon as it is dropped"]
pub struct InputGuard<'a> {
    lock: SharedMutexGuard<'a>,
    fields: &'a UnsafeCell<InputFields>,
}

impl<'a> InputGuard<'a> {
    pub(crate) fn new(lock: SharedMutexGuard<'a>, fields: &'a UnsafeCell<InputFields>) -> Self {
        Self { lock, fields }
    }

    /// Whether the mutex was recovered from an owner that died holding it.
    ///
    /// The fields may then hold a half-applied update from that owner.
    pub fn recovered(&self) -> bool {
        self.lock.recovered()
    }
}

impl Deref for InputGuard<'_> {
    type Target = InputFields;

    fn deref(&self) -> &InputFields {
        // SAFETY: the input mutex is held for the guard's lifetime
        unsafe { &*self.fields.get() }
    }
}

impl DerefMut for InputGuard<'_> {
    fn deref_mut(&mut self) -> &mut InputFields {
        // SAFETY: the input mutex is held and &mut self makes this the only
        // reference handed out by the guard
        unsafe { &mut *self.fields.get() }
    }
}
