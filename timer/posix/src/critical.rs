//! Tick lock for POSIX
//!
//! Unlike embedded targets, the tick source is a real thread here, so the
//! counter is guarded by an OS mutex rather than by masking an interrupt.

use std::sync::{Mutex, PoisonError};

use swtimer_core::{TickContext, TickLock};

/// Tick counter lock backed by `std::sync::Mutex`
#[derive(Debug, Default)]
pub struct StdMutexLock {
    mutex: Mutex<()>,
}

impl StdMutexLock {
    pub const fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
        }
    }
}

impl TickLock for StdMutexLock {
    fn with_lock<R>(&self, _context: TickContext, f: impl FnOnce() -> R) -> R {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        let _guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
