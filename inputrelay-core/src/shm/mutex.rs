// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Process-shared mutex embedded in a shared region.
//!
//! Wraps a `pthread_mutex_t` initialised in place with
//! `PTHREAD_PROCESS_SHARED` so every process mapping the region arbitrates
//! on the same lock. On Linux the mutex is also robust: if a holder dies
//! without releasing, the next acquirer recovers it instead of hanging.

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::time::Duration;

use crate::error::LockError;

/// How long an acquisition may wait for the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Give up once the bound elapses; a zero bound never blocks.
    Bounded(Duration),
    /// Block until the lock is obtained. Cannot be cancelled.
    Infinite,
}

impl WaitPolicy {
    /// Bound used by per-frame input events.
    pub const INPUT_EVENT: Self = Self::Bounded(Duration::from_millis(10));

    fn waited_ms(&self) -> u64 {
        match self {
            Self::Bounded(timeout) => u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            Self::Infinite => u64::MAX,
        }
    }
}

/// Mutex living inside shared memory.
///
/// Never moved or copied once initialised: it is only reached through a
/// pointer into the mapping.
#[repr(C)]
pub struct SharedMutex {
    raw: UnsafeCell<libc::pthread_mutex_t>,
}

// SAFETY: pthread mutexes are designed for concurrent use; the process-shared
// attribute extends that across processes.
unsafe impl Sync for SharedMutex {}

impl SharedMutex {
    /// Initialise the mutex in place.
    ///
    /// # Safety
    /// `this` must point to writable memory inside a shared mapping that no
    /// other thread or process uses yet, and must not be initialised twice.
    pub unsafe fn init_in_place(this: *mut Self) -> Result<(), LockError> {
        let mut attr = std::mem::MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
        check("pthread_mutexattr_init", libc::pthread_mutexattr_init(attr.as_mut_ptr()))?;

        let mut result = Self::configure(attr.as_mut_ptr());
        if result.is_ok() {
            let raw = UnsafeCell::raw_get(std::ptr::addr_of!((*this).raw));
            result = check("pthread_mutex_init", libc::pthread_mutex_init(raw, attr.as_ptr()));
        }

        libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
        result
    }

    unsafe fn configure(attr: *mut libc::pthread_mutexattr_t) -> Result<(), LockError> {
        check(
            "pthread_mutexattr_setpshared",
            libc::pthread_mutexattr_setpshared(attr, libc::PTHREAD_PROCESS_SHARED),
        )?;
        check(
            "pthread_mutexattr_settype",
            libc::pthread_mutexattr_settype(attr, libc::PTHREAD_MUTEX_ERRORCHECK),
        )?;
        #[cfg(target_os = "linux")]
        check(
            "pthread_mutexattr_setrobust",
            libc::pthread_mutexattr_setrobust(attr, libc::PTHREAD_MUTEX_ROBUST),
        )?;
        Ok(())
    }

    /// Acquire the mutex according to `policy`.
    ///
    /// The returned guard releases the mutex when dropped, on every exit path.
    pub fn lock(&self, policy: WaitPolicy) -> Result<SharedMutexGuard<'_>, LockError> {
        let code = match policy {
            WaitPolicy::Infinite => {
                // SAFETY: raw is an initialised process-shared mutex
                unsafe { libc::pthread_mutex_lock(self.raw.get()) }
            }
            WaitPolicy::Bounded(timeout) if timeout.is_zero() => {
                // SAFETY: as above
                unsafe { libc::pthread_mutex_trylock(self.raw.get()) }
            }
            WaitPolicy::Bounded(timeout) => self.timed_lock(timeout),
        };

        let recovered = match code {
            0 => false,
            libc::EBUSY | libc::ETIMEDOUT => {
                return Err(LockError::AcquireTimeout {
                    waited_ms: policy.waited_ms(),
                })
            }
            libc::EDEADLK => return Err(LockError::WouldDeadlock),
            #[cfg(target_os = "linux")]
            libc::EOWNERDEAD => {
                self.make_consistent()?;
                tracing::warn!("Recovered input guard abandoned by a dead owner");
                true
            }
            #[cfg(target_os = "linux")]
            libc::ENOTRECOVERABLE => return Err(LockError::NotRecoverable),
            other => return Err(syscall_error("pthread_mutex_lock", other)),
        };

        Ok(SharedMutexGuard {
            mutex: self,
            recovered,
            _not_send: PhantomData,
        })
    }

    /// Deadline past what the clock or `time_t` can hold waits without one.
    #[cfg(target_os = "linux")]
    fn timed_lock(&self, timeout: Duration) -> i32 {
        let since_epoch = std::time::SystemTime::now()
            .checked_add(timeout)
            .and_then(|deadline| deadline.duration_since(std::time::UNIX_EPOCH).ok());
        let Some((secs, nanos)) = since_epoch.and_then(|d| {
            libc::time_t::try_from(d.as_secs())
                .ok()
                .map(|secs| (secs, d.subsec_nanos()))
        }) else {
            // SAFETY: raw is an initialised process-shared mutex
            return unsafe { libc::pthread_mutex_lock(self.raw.get()) };
        };

        // SAFETY: timespec is plain integers
        let mut abstime: libc::timespec = unsafe { std::mem::zeroed() };
        abstime.tv_sec = secs;
        abstime.tv_nsec = nanos as _;
        // SAFETY: raw is an initialised mutex and abstime a valid timespec
        unsafe { libc::pthread_mutex_timedlock(self.raw.get(), &abstime) }
    }

    /// No timed lock on this platform: poll with trylock until the deadline.
    #[cfg(not(target_os = "linux"))]
    fn timed_lock(&self, timeout: Duration) -> i32 {
        const POLL_INTERVAL: Duration = Duration::from_micros(200);
        let start = std::time::Instant::now();
        loop {
            // SAFETY: raw is an initialised mutex
            let code = unsafe { libc::pthread_mutex_trylock(self.raw.get()) };
            if code != libc::EBUSY {
                return code;
            }
            if start.elapsed() >= timeout {
                return libc::ETIMEDOUT;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    #[cfg(target_os = "linux")]
    fn make_consistent(&self) -> Result<(), LockError> {
        // SAFETY: we own the mutex after EOWNERDEAD
        let code = unsafe { libc::pthread_mutex_consistent(self.raw.get()) };
        if code != 0 {
            // SAFETY: still the owner; release so others see ENOTRECOVERABLE
            unsafe { libc::pthread_mutex_unlock(self.raw.get()) };
            return Err(syscall_error("pthread_mutex_consistent", code));
        }
        Ok(())
    }
}

/// Held state of a [`SharedMutex`].
///
/// Released exactly once, when dropped. Not `Send`: the thread that
/// acquired the mutex is the one that releases it.
#[must_use = "the input guard is released as soon as it is dropped"]
pub struct SharedMutexGuard<'a> {
    mutex: &'a SharedMutex,
    recovered: bool,
    _not_send: PhantomData<*const ()>,
}

impl SharedMutexGuard<'_> {
    /// Whether the previous owner died while holding the mutex.
    pub fn recovered(&self) -> bool {
        self.recovered
    }
}

impl Drop for SharedMutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard exists only while this thread owns the mutex
        let code = unsafe { libc::pthread_mutex_unlock(self.mutex.raw.get()) };
        if code != 0 {
            tracing::error!(
                error = %std::io::Error::from_raw_os_error(code),
                "Failed to release input guard"
            );
        }
    }
}

fn check(call: &'static str, code: i32) -> Result<(), LockError> {
    if code == 0 {
        Ok(())
    } else {
        Err(syscall_error(call, code))
    }
}

fn syscall_error(call: &'static str, code: i32) -> LockError {
    LockError::Syscall {
        call,
        reason: std::io::Error::from_raw_os_error(code).to_string(),
    }
}
