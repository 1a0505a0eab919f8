//! # Software Timer POSIX Port
//!
//! Runs the timer manager on Linux and other POSIX hosts:
//!
//! - [`StdMutexLock`] guards the tick counter with an OS mutex instead of
//!   interrupt masking;
//! - [`Ticker`] plays the hardware tick source, a thread that increments a
//!   [`TimeBase`](swtimer_manager::TimeBase) at a fixed rate.
//!
//! The dispatch context is whichever thread owns the
//! [`TimerManager`](swtimer_manager::TimerManager) and calls `run`.

pub mod critical;
pub mod ticker;

pub use critical::*;
pub use ticker::*;

/// Shorthand for a time base guarded by [`StdMutexLock`]
pub type StdTimeBase = swtimer_manager::TimeBase<StdMutexLock>;
