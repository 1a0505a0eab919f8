//! Timer manager: pool lifecycle and polled dispatch

use swtimer_core::{
    ExpiryCallback, PoolStats, Tick, TickLock, TimerError, TimerHandle, TimerMode, TimerPool,
    TimerResult, TimerState,
};

use crate::{TimeBase, MAX_TIMER_COUNT};

/// Fixed pool of `N` software timers driven by a [`TimeBase`]
///
/// Every operation fails with [`TimerError::NotInitialized`] until
/// [`init`](Self::init) attaches a time base. `uninit` detaches it again but
/// leaves the timers in place; their handles work again after the next
/// `init`. Pool-wide figures ([`stats`](Self::stats),
/// [`capacity`](Self::capacity)) stay readable while uninitialized.
///
/// # Re-entrancy
///
/// Expiry callbacks run inside [`run`](Self::run) while the pool is being
/// scanned. They receive only the firing handle: the manager is mutably
/// borrowed for the whole scan, so a callback cannot create, delete, start
/// or stop timers on it. Record the handle and act after `run` returns.
pub struct TimerManager<'a, L, const N: usize = MAX_TIMER_COUNT> {
    pool: TimerPool<N>,
    time_base: Option<&'a TimeBase<L>>,
}

impl<'a, L: TickLock, const N: usize> TimerManager<'a, L, N> {
    /// Create an uninitialized manager with every slot free
    pub const fn new() -> Self {
        Self {
            pool: TimerPool::new(),
            time_base: None,
        }
    }

    /// Attach the time base and accept operations
    ///
    /// Fails if this manager is already initialized or another manager
    /// already drives `time_base`.
    pub fn init(&mut self, time_base: &'a TimeBase<L>) -> TimerResult<()> {
        if self.time_base.is_some() || !time_base.attach() {
            log::warn!("timer manager already initialized");
            return Err(TimerError::AlreadyInitialized);
        }

        self.time_base = Some(time_base);
        log::debug!("timer manager initialized with {} slots", N);
        Ok(())
    }

    /// Detach the time base
    ///
    /// Existing timers are kept but neither fire nor accept operations until
    /// the manager is initialized again. Ticks are refused meanwhile.
    pub fn uninit(&mut self) -> TimerResult<()> {
        let time_base = self.time_base.take().ok_or(TimerError::NotInitialized)?;
        time_base.detach();
        log::debug!("timer manager uninitialized");
        Ok(())
    }

    /// Check if the manager accepts operations
    pub fn is_initialized(&self) -> bool {
        self.time_base.is_some()
    }

    /// Allocate an idle timer that will call `callback` when it expires
    pub fn create(&mut self, callback: ExpiryCallback) -> TimerResult<TimerHandle> {
        self.time_base()?;
        let handle = self.pool.allocate(callback).map_err(|err| {
            log::warn!("no free timer slot ({} in use)", N);
            err
        })?;
        log::debug!("created {handle}");
        Ok(handle)
    }

    /// Delete a timer and clear the caller's handle
    ///
    /// The slot is immediately available to `create`. An empty handle is
    /// rejected and leaves the pool untouched.
    pub fn delete(&mut self, handle: &mut Option<TimerHandle>) -> TimerResult<()> {
        self.time_base()?;
        let timer = handle.ok_or(TimerError::InvalidHandle)?;
        self.pool.release(timer)?;
        *handle = None;
        log::debug!("deleted {timer}");
        Ok(())
    }

    /// Start a timer that expires `ticks` ticks from now
    ///
    /// Starting an armed timer restarts it from the current tick with the
    /// new parameters.
    pub fn start(&mut self, handle: TimerHandle, ticks: u32, mode: TimerMode) -> TimerResult<()> {
        let time_base = self.time_base()?;
        if !self.pool.contains(handle) {
            return Err(TimerError::InvalidHandle);
        }

        let now = time_base.now();
        self.pool.arm(handle, now, ticks, mode)?;
        log::trace!("started {handle} at {now} for {ticks} ticks ({mode:?})");
        Ok(())
    }

    /// Stop a timer. Stopping an idle timer succeeds.
    pub fn stop(&mut self, handle: TimerHandle) -> TimerResult<()> {
        self.time_base()?;
        self.pool.disarm(handle)?;
        log::trace!("stopped {handle}");
        Ok(())
    }

    /// Fire every expired timer
    ///
    /// Call regularly from the dispatch context. The counter is read once,
    /// under the lock, then every armed slot is checked against that tick in
    /// ascending slot order. Returns the number of callbacks invoked, or 0
    /// without touching the lock when the manager is not initialized.
    pub fn run(&mut self) -> usize {
        let Some(time_base) = self.time_base else {
            return 0;
        };

        let now = time_base.now();
        self.pool.dispatch(now)
    }

    /// Advance the attached time base by one tick
    ///
    /// Convenience for setups where the tick source can reach the manager;
    /// otherwise call [`TimeBase::increment`] directly.
    pub fn increment_time_base(&self) -> TimerResult<()> {
        self.time_base()?.increment()
    }

    /// Read the current tick
    pub fn now(&self) -> TimerResult<Tick> {
        Ok(self.time_base()?.now())
    }

    /// Get the state of a timer
    pub fn state(&self, handle: TimerHandle) -> TimerResult<TimerState> {
        self.time_base()?;
        self.pool.state(handle)
    }

    /// Ticks left before a timer expires, `None` if it is idle
    pub fn remaining(&self, handle: TimerHandle) -> TimerResult<Option<u32>> {
        let now = self.now()?;
        self.pool.remaining(handle, now)
    }

    /// Get a snapshot of pool occupancy
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Handles of every armed timer, in slot order
    pub fn armed_handles(&self) -> heapless::Vec<TimerHandle, N> {
        self.pool.armed_handles()
    }

    /// Get the number of timer slots
    pub const fn capacity(&self) -> usize {
        N
    }

    fn time_base(&self) -> TimerResult<&'a TimeBase<L>> {
        self.time_base.ok_or(TimerError::NotInitialized)
    }
}

impl<'a, L: TickLock, const N: usize> Default for TimerManager<'a, L, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, L, const N: usize> Drop for TimerManager<'a, L, N> {
    fn drop(&mut self) {
        if let Some(time_base) = self.time_base.take() {
            time_base.detach();
        }
    }
}
