// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Shared Memory module.
//!
//! Named POSIX shared memory regions, a typed view with a creation
//! handshake, and the process-shared mutex embedded in the layout.

mod mutex;
mod region;
mod view;

pub use mutex::{SharedMutex, SharedMutexGuard, WaitPolicy};
pub use region::SharedRegion;
pub use view::{RegionLayout, SharedView, HEADER_SIZE};
