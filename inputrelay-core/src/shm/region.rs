//! SharedRegion - POSIX shared memory wrapper.
//!
//! Provides safe abstraction over mmap and shm_open for the input relay.
//! The region is opened-or-created by name, so whichever process comes up
//! first creates it and every later process maps the same bytes.
//! All unsafe operations are encapsulated with size checking.

use std::os::fd::{AsRawFd, OwnedFd};
use std::ptr::NonNull;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{shm_open, shm_unlink};
use nix::sys::stat::Mode;

use crate::error::RegionError;
use crate::types::check_region_name;

/// Poll interval while waiting for a creator to size the object.
const SIZE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How often an opener retries when the name vanishes between
/// the exclusive create and the plain open.
const OPEN_RETRIES: usize = 3;

/// Represents a mapped shared memory region.
///
/// This struct owns the mapping and will unmap it on drop. It never unlinks
/// the name: the region stays available to other processes until it is
/// removed explicitly with [`SharedRegion::unlink`].
pub struct SharedRegion {
    /// Name of the shared memory object (without the leading slash).
    name: String,
    /// Pointer to the mapped memory.
    ptr: NonNull<u8>,
    /// Size of the mapped region in bytes.
    size: usize,
    /// Shared memory object, closed on drop.
    _fd: OwnedFd,
    /// Whether this handle created the object.
    created: bool,
}

// SAFETY: SharedRegion owns its mapping; the pointer stays valid wherever
// the handle moves.
unsafe impl Send for SharedRegion {}

// SAFETY: the region hands out raw pointers only. Every typed access goes
// through an interior lock of the layout placed inside it.
unsafe impl Sync for SharedRegion {}

impl SharedRegion {
    /// Maximum size for a shared region (16 MB).
    pub const MAX_SIZE: usize = 16 * 1024 * 1024;

    /// Open the named region, creating it if no process has yet.
    ///
    /// A freshly created region is zero-filled. An opener waits up to
    /// `size_wait` for the creator to size the object, then requires the
    /// size to match exactly.
    ///
    /// # Errors
    /// Returns RegionError if the name is invalid, the existing object has
    /// a different size, or the OS refuses to open or map it.
    pub fn open_or_create(
        name: &str,
        size: usize,
        size_wait: Duration,
    ) -> Result<Self, RegionError> {
        check_region_name(name).map_err(|reason| RegionError::InvalidName {
            name: name.to_string(),
            reason,
        })?;

        if size == 0 || size > Self::MAX_SIZE {
            return Err(RegionError::InvalidSize {
                size,
                reason: format!("Must be between 1 and {} bytes", Self::MAX_SIZE),
            });
        }

        let shm_name = format!("/{}", name);
        let (fd, created) = Self::open_fd(name, &shm_name)?;

        if created {
            // SAFETY: fd is a valid shared memory descriptor
            let result = unsafe { libc::ftruncate(fd.as_raw_fd(), size as libc::off_t) };
            if result < 0 {
                let errno = std::io::Error::last_os_error();
                let _ = shm_unlink(shm_name.as_str());
                return Err(RegionError::OpenFailed {
                    name: name.to_string(),
                    reason: format!("ftruncate failed: {}", errno),
                });
            }
        } else {
            let actual = Self::wait_for_size(name, &fd, size_wait)?;
            if actual != size {
                return Err(RegionError::SizeMismatch {
                    name: name.to_string(),
                    expected: size,
                    actual,
                });
            }
        }

        // Map the memory
        // SAFETY: fd is valid and the object is exactly `size` bytes
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd.as_raw_fd(),
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            let errno = std::io::Error::last_os_error();
            if created {
                let _ = shm_unlink(shm_name.as_str());
            }
            return Err(RegionError::MapFailed {
                reason: format!("mmap failed: {}", errno),
            });
        }

        let ptr = NonNull::new(ptr as *mut u8).ok_or_else(|| RegionError::MapFailed {
            reason: "mmap returned null".to_string(),
        })?;

        if created {
            tracing::debug!(name = %name, size = size, "Created shared region");
        } else {
            tracing::debug!(name = %name, size = size, "Opened shared region");
        }

        Ok(Self {
            name: name.to_string(),
            ptr,
            size,
            _fd: fd,
            created,
        })
    }

    /// Remove the region name from the system.
    ///
    /// Processes that already mapped it keep their mapping; the next
    /// `open_or_create` starts from a fresh, zeroed region.
    pub fn unlink(name: &str) -> Result<(), RegionError> {
        check_region_name(name).map_err(|reason| RegionError::InvalidName {
            name: name.to_string(),
            reason,
        })?;

        shm_unlink(format!("/{}", name).as_str()).map_err(|errno| RegionError::UnlinkFailed {
            name: name.to_string(),
            reason: errno.to_string(),
        })?;

        tracing::debug!(name = %name, "Unlinked shared region");
        Ok(())
    }

    /// Exclusive create first; fall back to opening the existing object.
    fn open_fd(name: &str, shm_name: &str) -> Result<(OwnedFd, bool), RegionError> {
        let mode = Mode::S_IRUSR | Mode::S_IWUSR;

        for _ in 0..OPEN_RETRIES {
            match shm_open(shm_name, OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR, mode) {
                Ok(fd) => return Ok((fd, true)),
                Err(Errno::EEXIST) => {}
                Err(errno) => return Err(Self::open_error(name, errno)),
            }

            match shm_open(shm_name, OFlag::O_RDWR, Mode::empty()) {
                Ok(fd) => return Ok((fd, false)),
                // Unlinked between the two calls, try creating again
                Err(Errno::ENOENT) => continue,
                Err(errno) => return Err(Self::open_error(name, errno)),
            }
        }

        Err(RegionError::OpenFailed {
            name: name.to_string(),
            reason: "region was repeatedly removed while opening".to_string(),
        })
    }

    fn open_error(name: &str, errno: Errno) -> RegionError {
        match errno {
            Errno::EMFILE | Errno::ENFILE | Errno::ENOSPC | Errno::ENOMEM => {
                RegionError::ResourceExhausted {
                    name: name.to_string(),
                    reason: format!("shm_open failed: {}", errno),
                }
            }
            _ => RegionError::OpenFailed {
                name: name.to_string(),
                reason: format!("shm_open failed: {}", errno),
            },
        }
    }

    /// Current size of the object behind `fd`.
    fn object_size(name: &str, fd: &OwnedFd) -> Result<usize, RegionError> {
        let mut stat = std::mem::MaybeUninit::<libc::stat>::uninit();
        // SAFETY: fd is valid and stat points to writable storage
        let result = unsafe { libc::fstat(fd.as_raw_fd(), stat.as_mut_ptr()) };
        if result < 0 {
            return Err(RegionError::OpenFailed {
                name: name.to_string(),
                reason: format!("fstat failed: {}", std::io::Error::last_os_error()),
            });
        }
        // SAFETY: fstat succeeded and filled the struct
        let stat = unsafe { stat.assume_init() };
        Ok(stat.st_size as usize)
    }

    /// Wait for the creator's ftruncate; a zero size means it has not run yet.
    fn wait_for_size(name: &str, fd: &OwnedFd, wait: Duration) -> Result<usize, RegionError> {
        let start = Instant::now();
        loop {
            let size = Self::object_size(name, fd)?;
            if size != 0 || start.elapsed() >= wait {
                return Ok(size);
            }
            std::thread::sleep(SIZE_POLL_INTERVAL);
        }
    }

    /// Get the name of this shared region.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the size of this shared region.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether this handle created the region (rather than opening it).
    pub fn created(&self) -> bool {
        self.created
    }

    /// Get a raw pointer to the shared memory.
    ///
    /// Callers must synchronize every access through the layout's own lock.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for SharedRegion {
    fn drop(&mut self) {
        // SAFETY: ptr and size were set by a successful mmap
        let result = unsafe { libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.size) };
        if result < 0 {
            tracing::error!(
                name = %self.name,
                error = %std::io::Error::last_os_error(),
                "Failed to unmap shared region"
            );
        }
        // fd closes with the OwnedFd
    }
}
