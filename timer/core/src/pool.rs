//! Fixed-capacity timer pool
//!
//! The pool owns every timer slot and implements the whole timer lifecycle:
//! allocation by first-free linear scan, arming, disarming, release, and the
//! expiry scan that fires callbacks. Front-ends decide where the current tick
//! comes from and which execution context calls [`TimerPool::dispatch`].

use crate::{Tick, TimerError, TimerHandle, TimerMode, TimerResult};

/// Function called when a timer expires, with the handle of that timer
pub type ExpiryCallback = fn(TimerHandle);

/// Externally visible state of an allocated timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Allocated but not counting
    Idle,
    /// Counting towards expiry
    Armed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TimerState::Idle => defmt::write!(fmt, "Idle"),
            TimerState::Armed => defmt::write!(fmt, "Armed"),
        }
    }
}

/// Pool occupancy figures for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of slots
    pub capacity: usize,
    /// Slots holding a timer
    pub used: usize,
    /// Slots holding an armed timer
    pub armed: usize,
    /// Highest number of slots ever used at once
    pub peak_used: usize,
}

impl PoolStats {
    /// Number of slots still available to `allocate`
    pub const fn free(&self) -> usize {
        self.capacity - self.used
    }

    /// Check if no slot is left
    pub const fn is_full(&self) -> bool {
        self.used == self.capacity
    }

    /// Get utilization as a percentage (0-100)
    pub fn utilization(&self) -> u8 {
        if self.capacity == 0 {
            0
        } else {
            ((self.used * 100) / self.capacity) as u8
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PoolStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "PoolStats{{ capacity: {}, used: {}, armed: {}, peak: {} }}",
            self.capacity,
            self.used,
            self.armed,
            self.peak_used
        );
    }
}

/// One pool entry. Free iff `callback` is `None`.
#[derive(Clone, Copy)]
struct Slot {
    callback: Option<ExpiryCallback>,
    generation: u32,
    target: u32,
    start: Tick,
    started: bool,
    periodic: bool,
}

impl Slot {
    const FREE: Self = Self {
        callback: None,
        generation: 0,
        target: 0,
        start: Tick::ZERO,
        started: false,
        periodic: false,
    };

    fn is_free(&self) -> bool {
        self.callback.is_none()
    }

    /// Return the slot to its free state, keeping the generation moving.
    fn clear(&mut self) {
        *self = Self {
            generation: self.generation.wrapping_add(1),
            ..Self::FREE
        };
    }
}

/// Fixed array of `N` timer slots
pub struct TimerPool<const N: usize> {
    slots: [Slot; N],
    peak_used: usize,
}

impl<const N: usize> TimerPool<N> {
    /// Handles store the slot index as `u16`.
    const CAPACITY_FITS_HANDLE: () = assert!(N <= u16::MAX as usize, "timer pool too large");

    /// Create a pool with every slot free
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS_HANDLE;
        Self {
            slots: [Slot::FREE; N],
            peak_used: 0,
        }
    }

    /// Get the number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Claim the first free slot, scanning from index 0
    ///
    /// The timer starts idle. Its start tick and target are left untouched
    /// until [`arm`](Self::arm) sets them.
    pub fn allocate(&mut self, callback: ExpiryCallback) -> TimerResult<TimerHandle> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_free())
            .ok_or(TimerError::PoolExhausted)?;

        slot.callback = Some(callback);
        slot.started = false;
        slot.periodic = false;
        let handle = TimerHandle::new(index as u16, slot.generation);

        let used = self.used();
        if used > self.peak_used {
            self.peak_used = used;
        }
        Ok(handle)
    }

    /// Free the slot behind `handle`
    ///
    /// Every copy of `handle` becomes stale.
    pub fn release(&mut self, handle: TimerHandle) -> TimerResult<()> {
        self.slot_mut(handle)?.clear();
        Ok(())
    }

    /// Start (or restart) a timer counting from `now`
    pub fn arm(&mut self, handle: TimerHandle, now: Tick, ticks: u32, mode: TimerMode) -> TimerResult<()> {
        let slot = self.slot_mut(handle)?;
        slot.start = now;
        slot.target = ticks;
        slot.started = true;
        slot.periodic = mode.is_periodic();
        Ok(())
    }

    /// Stop a timer. Stopping an idle timer is not an error.
    pub fn disarm(&mut self, handle: TimerHandle) -> TimerResult<()> {
        let slot = self.slot_mut(handle)?;
        slot.started = false;
        slot.periodic = false;
        Ok(())
    }

    /// Free every slot and invalidate every outstanding handle
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| !slot.is_free()) {
            slot.clear();
        }
    }

    /// Check whether `handle` still refers to a live timer
    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.slot(handle).is_ok()
    }

    /// Get the state of the timer behind `handle`
    pub fn state(&self, handle: TimerHandle) -> TimerResult<TimerState> {
        let slot = self.slot(handle)?;
        Ok(if slot.started {
            TimerState::Armed
        } else {
            TimerState::Idle
        })
    }

    /// Ticks left before the timer fires, measured at `now`
    ///
    /// Returns `None` for an idle timer and `Some(0)` for one that is due but
    /// has not been dispatched yet.
    pub fn remaining(&self, handle: TimerHandle, now: Tick) -> TimerResult<Option<u32>> {
        let slot = self.slot(handle)?;
        if !slot.started {
            return Ok(None);
        }
        Ok(Some(slot.target.saturating_sub(now.elapsed_since(slot.start))))
    }

    /// Fire every armed timer whose target has elapsed at `now`
    ///
    /// Slots are visited in ascending index order and each expired timer is
    /// handled before its callback runs: a periodic timer re-arms from `now`,
    /// a one-shot timer goes idle. A periodic timer checked late fires once
    /// and re-arms from `now`; missed periods are not replayed.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&mut self, now: Tick) -> usize {
        let mut fired = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.started {
                continue;
            }

            let elapsed = now.elapsed_since(slot.start);
            if elapsed < slot.target {
                continue;
            }

            if slot.periodic {
                slot.start = now;
            } else {
                slot.started = false;
            }

            if let Some(callback) = slot.callback {
                let handle = TimerHandle::new(index as u16, slot.generation);
                log::trace!("{handle} expired at {now} after {elapsed} ticks");
                callback(handle);
                fired += 1;
            }
        }

        fired
    }

    /// Get a snapshot of pool occupancy
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: N,
            used: self.used(),
            armed: self.slots.iter().filter(|slot| slot.started).count(),
            peak_used: self.peak_used,
        }
    }

    /// Handles of every armed timer, in slot order
    pub fn armed_handles(&self) -> heapless::Vec<TimerHandle, N> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.started)
            .map(|(index, slot)| TimerHandle::new(index as u16, slot.generation))
            .collect()
    }

    fn used(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    fn slot(&self, handle: TimerHandle) -> TimerResult<&Slot> {
        match self.slots.get(handle.slot()) {
            Some(slot) if !slot.is_free() && slot.generation == handle.generation() => Ok(slot),
            _ => Err(TimerError::InvalidHandle),
        }
    }

    fn slot_mut(&mut self, handle: TimerHandle) -> TimerResult<&mut Slot> {
        match self.slots.get_mut(handle.slot()) {
            Some(slot) if !slot.is_free() && slot.generation == handle.generation() => Ok(slot),
            _ => Err(TimerError::InvalidHandle),
        }
    }
}

impl<const N: usize> Default for TimerPool<N> {
    fn default() -> Self {
        Self::new()
    }
}
