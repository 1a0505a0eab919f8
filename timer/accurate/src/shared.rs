//! Access from both the tick interrupt and the main code

use core::cell::RefCell;
use critical_section::Mutex;

use crate::{AccurateTimer, TickSource, MAX_ACCURATE_TIMER_COUNT};

/// [`AccurateTimer`] behind a critical-section mutex, usable from a `static`
///
/// ```
/// use swtimer_accurate::{SharedAccurateTimer, TickHooks, TimerHandle, TimerMode};
///
/// static TIMERS: SharedAccurateTimer<TickHooks> = SharedAccurateTimer::new();
///
/// fn led_toggle(_timer: TimerHandle) {}
/// fn hw_start() {}
/// fn hw_stop() {}
///
/// TIMERS.with(|timers| {
///     timers.init(TickHooks::new(hw_start, hw_stop))?;
///     let led = timers.create(led_toggle)?;
///     timers.start(led, 8_000, TimerMode::Periodic)
/// })
/// .unwrap();
///
/// // From the 16 kHz interrupt handler:
/// TIMERS.on_tick();
/// ```
pub struct SharedAccurateTimer<S, const N: usize = MAX_ACCURATE_TIMER_COUNT> {
    inner: Mutex<RefCell<AccurateTimer<S, N>>>,
}

impl<S: TickSource, const N: usize> SharedAccurateTimer<S, N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(AccurateTimer::new())),
        }
    }

    /// Run `f` on the timer inside a critical section
    ///
    /// # Panics
    ///
    /// If called again from inside `f` or from an expiry callback.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut AccurateTimer<S, N>) -> R,
    {
        critical_section::with(|cs| {
            let mut timer = self.inner.borrow_ref_mut(cs);
            f(&mut timer)
        })
    }

    /// Tick interrupt entry point
    ///
    /// Expiry callbacks run inside the critical section.
    ///
    /// # Panics
    ///
    /// If an expiry callback calls [`with`](Self::with) or `on_tick` on the
    /// same timer: the inner `RefCell` is already mutably borrowed.
    pub fn on_tick(&self) -> usize {
        self.with(|timer| timer.on_tick())
    }
}

impl<S: TickSource, const N: usize> Default for SharedAccurateTimer<S, N> {
    fn default() -> Self {
        Self::new()
    }
}
