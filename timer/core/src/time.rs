//! Tick counter and timer mode types

use core::fmt;

/// Snapshot of the 32-bit tick counter
///
/// The counter wraps at `u32::MAX`, so ticks are compared through
/// [`Tick::elapsed_since`] rather than with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tick(u32);

impl Tick {
    /// Zero tick
    pub const ZERO: Self = Self(0);

    /// Last tick before the counter wraps
    pub const MAX: Self = Self(u32::MAX);

    /// Create a tick from a raw counter value
    pub const fn new(ticks: u32) -> Self {
        Self(ticks)
    }

    /// Get the raw counter value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Advance the counter by one tick, wrapping to zero after `u32::MAX`
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Return the tick `ticks` after this one
    pub const fn wrapping_add(self, ticks: u32) -> Self {
        Self(self.0.wrapping_add(ticks))
    }

    /// Ticks elapsed between `start` and `self`
    ///
    /// When the counter wrapped since `start`, the result is
    /// `self + (u32::MAX - start) + 1`, which is exactly the modular
    /// difference. Correct as long as less than 2^32 ticks have passed.
    pub const fn elapsed_since(self, start: Tick) -> u32 {
        self.0.wrapping_sub(start.0)
    }
}

impl From<u32> for Tick {
    fn from(ticks: u32) -> Self {
        Self(ticks)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick:{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Tick {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "tick:{}", self.0);
    }
}

/// Whether a timer fires once or re-arms itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// Fire once, then go idle
    #[default]
    OneShot,
    /// Fire every period, re-arming from the firing tick
    Periodic,
}

impl TimerMode {
    /// Check if this is a periodic timer
    pub const fn is_periodic(self) -> bool {
        matches!(self, Self::Periodic)
    }

    /// Check if this is a one-shot timer
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::OneShot)
    }
}

impl From<bool> for TimerMode {
    fn from(is_periodic: bool) -> Self {
        if is_periodic {
            Self::Periodic
        } else {
            Self::OneShot
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OneShot => defmt::write!(fmt, "OneShot"),
            Self::Periodic => defmt::write!(fmt, "Periodic"),
        }
    }
}
