//! Shared tick counter

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use swtimer_core::{Tick, TickContext, TickLock, TimerError, TimerResult};

/// Tick counter shared between the tick source and the dispatch loop
///
/// The tick source only ever needs `&TimeBase`, so a single instance can
/// live in a `static` and be reached from an interrupt handler. The counter
/// is advanced with a plain load and store under the injected lock; the
/// atomics only make each word access tear-free and keep the type `Sync`.
///
/// Increments are refused until a [`TimerManager`](crate::TimerManager) has
/// been initialized with this time base.
pub struct TimeBase<L> {
    ticks: AtomicU32,
    attached: AtomicBool,
    lock: L,
}

impl<L: TickLock> TimeBase<L> {
    /// Create a time base starting at tick zero
    pub const fn new(lock: L) -> Self {
        Self::starting_at(lock, Tick::ZERO)
    }

    /// Create a time base starting at an arbitrary tick
    pub const fn starting_at(lock: L, tick: Tick) -> Self {
        Self {
            ticks: AtomicU32::new(tick.raw()),
            attached: AtomicBool::new(false),
            lock,
        }
    }

    /// Advance the counter by one tick
    ///
    /// Call from the tick source at a fixed rate. Fails without touching the
    /// lock while no manager is initialized.
    pub fn increment(&self) -> TimerResult<()> {
        if !self.is_attached() {
            return Err(TimerError::NotInitialized);
        }

        self.lock.with_lock(TickContext::Increment, || {
            let next = self.ticks.load(Ordering::Acquire).wrapping_add(1);
            self.ticks.store(next, Ordering::Release);
        });
        Ok(())
    }

    /// Read the counter from the dispatch context
    pub fn now(&self) -> Tick {
        self.lock
            .with_lock(TickContext::Dispatch, || Tick::new(self.ticks.load(Ordering::Acquire)))
    }
}

impl<L> TimeBase<L> {
    /// Check if a manager currently drives this time base
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Get the injected lock
    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// Claim the time base for one manager. Returns `false` if already taken.
    pub(crate) fn attach(&self) -> bool {
        !self.attached.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }
}
