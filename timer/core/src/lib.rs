#![no_std]
#![forbid(unsafe_code)]

//! # Software Timer Core
//!
//! Building blocks shared by the timer front-ends: wraparound-safe tick
//! arithmetic, versioned timer handles, the fixed-capacity timer pool and
//! the lock backends that guard the shared tick counter.
//!
//! The pool never allocates. Its capacity is a const generic chosen at build
//! time, and every slot is reached through a [`TimerHandle`] that carries a
//! generation tag, so a handle that outlives its timer is rejected instead of
//! aliasing whatever timer reuses the slot.

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub mod handle;
pub mod lock;
pub mod pool;
pub mod time;

pub use handle::*;
pub use lock::*;
pub use pool::*;
pub use time::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used by every timer operation
pub type TimerResult<T> = Result<T, TimerError>;

/// Reasons a timer operation can be refused
///
/// None of these are fatal. The caller changes the precondition (frees a
/// slot, initializes the layer, drops a stale handle) and tries again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Handle is empty, stale, or does not belong to this pool
    InvalidHandle,
    /// Every pool slot is occupied
    PoolExhausted,
    /// Operation issued before `init` or after `uninit`
    NotInitialized,
    /// `init` issued twice
    AlreadyInitialized,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::InvalidHandle => write!(f, "Invalid timer handle"),
            TimerError::PoolExhausted => write!(f, "Timer pool exhausted"),
            TimerError::NotInitialized => write!(f, "Timer layer not initialized"),
            TimerError::AlreadyInitialized => write!(f, "Timer layer already initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimerError {}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TimerError::InvalidHandle => defmt::write!(fmt, "InvalidHandle"),
            TimerError::PoolExhausted => defmt::write!(fmt, "PoolExhausted"),
            TimerError::NotInitialized => defmt::write!(fmt, "NotInitialized"),
            TimerError::AlreadyInitialized => defmt::write!(fmt, "AlreadyInitialized"),
        }
    }
}
