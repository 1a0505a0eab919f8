#![no_std]
#![forbid(unsafe_code)]

//! # Accurate Timer
//!
//! Software timers dispatched straight from the tick interrupt. Every call
//! to [`AccurateTimer::on_tick`] advances the counter and fires whatever
//! expired on that tick, so expiry latency is one tick period at most
//! (62.5 µs at the default 16 kHz rate).
//!
//! Expiry callbacks therefore run in interrupt context and must stay short.
//! There is no lock: the counter and the pool are only touched by whoever
//! holds the [`AccurateTimer`], and [`SharedAccurateTimer`] serializes the
//! interrupt handler and the main code through `critical-section`.

pub mod shared;
pub mod source;
pub mod timer;

pub use shared::*;
pub use source::*;
pub use timer::*;

pub use swtimer_core::{
    ExpiryCallback, PoolStats, Tick, TimerError, TimerHandle, TimerMode, TimerResult, TimerState,
};

/// Default number of timers
pub const MAX_ACCURATE_TIMER_COUNT: usize = 5;

/// Tick rate the hardware tick source is configured for
pub const ACCURATE_TICK_HZ: u32 = 16_000;

/// Convert microseconds to ticks, rounding down and saturating
pub const fn ticks_from_micros(micros: u32) -> u32 {
    let ticks = micros as u64 * ACCURATE_TICK_HZ as u64 / 1_000_000;
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Convert milliseconds to ticks, saturating
pub const fn ticks_from_millis(millis: u32) -> u32 {
    let ticks = millis as u64 * ACCURATE_TICK_HZ as u64 / 1_000;
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Sleep until the next interrupt
///
/// Main loops that only react to timer expiries can call this between
/// iterations.
pub fn wait_for_tick() {
    #[cfg(target_arch = "arm")]
    {
        cortex_m::asm::wfi();
    }

    #[cfg(not(target_arch = "arm"))]
    {
        core::hint::spin_loop();
    }
}
