//! Interrupt-dispatched timer pool

use swtimer_core::{
    ExpiryCallback, PoolStats, Tick, TimerError, TimerHandle, TimerMode, TimerPool, TimerResult,
    TimerState,
};

use crate::{TickSource, MAX_ACCURATE_TIMER_COUNT};

/// Pool of `N` timers advanced and dispatched by the tick interrupt
///
/// Unlike the polled timer manager, `uninit` frees every timer: the tick
/// source is shut down and all outstanding handles become stale.
pub struct AccurateTimer<S, const N: usize = MAX_ACCURATE_TIMER_COUNT> {
    pool: TimerPool<N>,
    ticks: Tick,
    source: Option<S>,
}

impl<S: TickSource, const N: usize> AccurateTimer<S, N> {
    /// Create an uninitialized timer pool
    pub const fn new() -> Self {
        Self {
            pool: TimerPool::new(),
            ticks: Tick::ZERO,
            source: None,
        }
    }

    /// Start the tick source and accept operations
    pub fn init(&mut self, mut source: S) -> TimerResult<()> {
        if self.source.is_some() {
            return Err(TimerError::AlreadyInitialized);
        }

        source.start();
        self.source = Some(source);
        log::debug!("accurate timer initialized with {} slots", N);
        Ok(())
    }

    /// Stop the tick source, delete every timer and hand the source back
    pub fn uninit(&mut self) -> TimerResult<S> {
        let mut source = self.source.take().ok_or(TimerError::NotInitialized)?;
        source.stop();
        self.pool.reset();
        log::debug!("accurate timer uninitialized");
        Ok(source)
    }

    /// Check if the tick source is running
    pub fn is_initialized(&self) -> bool {
        self.source.is_some()
    }

    /// Allocate an idle timer
    ///
    /// `callback` runs in the tick interrupt.
    pub fn create(&mut self, callback: ExpiryCallback) -> TimerResult<TimerHandle> {
        self.ensure_initialized()?;
        self.pool.allocate(callback)
    }

    /// Delete a timer and clear the caller's handle
    pub fn delete(&mut self, handle: &mut Option<TimerHandle>) -> TimerResult<()> {
        self.ensure_initialized()?;
        let timer = handle.ok_or(TimerError::InvalidHandle)?;
        self.pool.release(timer)?;
        *handle = None;
        Ok(())
    }

    /// Start or restart a timer expiring `ticks` ticks from now
    pub fn start(&mut self, handle: TimerHandle, ticks: u32, mode: TimerMode) -> TimerResult<()> {
        self.ensure_initialized()?;
        self.pool.arm(handle, self.ticks, ticks, mode)
    }

    /// Stop a timer
    pub fn stop(&mut self, handle: TimerHandle) -> TimerResult<()> {
        self.ensure_initialized()?;
        self.pool.disarm(handle)
    }

    /// Tick interrupt entry point
    ///
    /// Advances the counter and fires every timer that expired on this tick.
    /// Returns the number of callbacks invoked; does nothing while
    /// uninitialized.
    pub fn on_tick(&mut self) -> usize {
        if self.source.is_none() {
            return 0;
        }

        self.ticks.increment();
        self.pool.dispatch(self.ticks)
    }

    /// Get the current tick
    pub fn now(&self) -> TimerResult<Tick> {
        self.ensure_initialized()?;
        Ok(self.ticks)
    }

    /// Get the state of a timer
    pub fn state(&self, handle: TimerHandle) -> TimerResult<TimerState> {
        self.ensure_initialized()?;
        self.pool.state(handle)
    }

    /// Ticks left before a timer expires, `None` if it is idle
    pub fn remaining(&self, handle: TimerHandle) -> TimerResult<Option<u32>> {
        self.ensure_initialized()?;
        self.pool.remaining(handle, self.ticks)
    }

    /// Get a snapshot of pool occupancy
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Get the number of timer slots
    pub const fn capacity(&self) -> usize {
        N
    }

    fn ensure_initialized(&self) -> TimerResult<()> {
        if self.source.is_some() {
            Ok(())
        } else {
            Err(TimerError::NotInitialized)
        }
    }
}

impl<S: TickSource, const N: usize> Default for AccurateTimer<S, N> {
    fn default() -> Self {
        Self::new()
    }
}
