//! Timer handles

use core::fmt;

/// Opaque reference to one timer in a pool
///
/// A handle names a slot and the generation the slot had when the timer was
/// created. Deleting the timer bumps the slot's generation, so copies of the
/// old handle stop matching and are rejected with
/// [`TimerError::InvalidHandle`](crate::TimerError::InvalidHandle).
///
/// Generations are 32-bit: a stale handle only matches again after 2^32
/// deletions on its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    slot: u16,
    generation: u32,
}

impl TimerHandle {
    pub(crate) const fn new(slot: u16, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Pool slot index this handle points at
    pub const fn slot(self) -> usize {
        self.slot as usize
    }

    /// Generation of the slot when the handle was issued
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}.{}", self.slot, self.generation)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerHandle {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "timer#{}.{}", self.slot, self.generation);
    }
}
