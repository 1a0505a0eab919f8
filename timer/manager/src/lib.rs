#![no_std]
#![forbid(unsafe_code)]

//! # Software Timer Manager
//!
//! Tick-driven software timers with time advancement and dispatch split
//! across two execution contexts:
//!
//! - the tick source (typically a timer interrupt) calls
//!   [`TimeBase::increment`] at a fixed rate;
//! - the main loop calls [`TimerManager::run`], which reads the counter once
//!   and fires every expired timer, synchronously, in slot order.
//!
//! Only the counter inside [`TimeBase`] is shared. It is guarded by the
//! [`TickLock`](swtimer_core::TickLock) injected at construction. The pool
//! belongs to the [`TimerManager`], which the dispatch context owns, so the
//! tick source has no path to the slots.
//!
//! ```
//! use swtimer_core::{NoLock, TimerHandle, TimerMode};
//! use swtimer_manager::{TimeBase, TimerManager};
//!
//! fn on_expiry(_timer: TimerHandle) {}
//!
//! let time_base = TimeBase::new(NoLock);
//! let mut timers: TimerManager<'_, NoLock> = TimerManager::new();
//! timers.init(&time_base).unwrap();
//!
//! let blink = timers.create(on_expiry).unwrap();
//! timers.start(blink, 3, TimerMode::Periodic).unwrap();
//!
//! for _ in 0..3 {
//!     time_base.increment().unwrap();
//! }
//! assert_eq!(timers.run(), 1);
//! ```

pub mod manager;
pub mod time_base;

pub use manager::*;
pub use time_base::*;

pub use swtimer_core::{
    ExpiryCallback, PoolStats, Tick, TickContext, TickLock, TimerError, TimerHandle, TimerMode,
    TimerResult, TimerState,
};

/// Default number of timers a manager can hold
pub const MAX_TIMER_COUNT: usize = 10;
