//! Hardware tick source

/// Peripheral that calls [`AccurateTimer::on_tick`](crate::AccurateTimer::on_tick)
/// at [`ACCURATE_TICK_HZ`](crate::ACCURATE_TICK_HZ)
pub trait TickSource {
    /// Configure the peripheral, register the interrupt and start ticking
    fn start(&mut self);

    /// Unregister the interrupt and stop the peripheral
    fn stop(&mut self);
}

/// Tick source described by two board-support functions
///
/// ```
/// use swtimer_accurate::{AccurateTimer, TickHooks};
///
/// fn timer0_enable() {}
/// fn timer0_disable() {}
///
/// let mut timers: AccurateTimer<TickHooks> = AccurateTimer::new();
/// timers.init(TickHooks::new(timer0_enable, timer0_disable)).unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TickHooks {
    pub start: fn(),
    pub stop: fn(),
}

impl TickHooks {
    pub const fn new(start: fn(), stop: fn()) -> Self {
        Self { start, stop }
    }
}

impl TickSource for TickHooks {
    fn start(&mut self) {
        (self.start)()
    }

    fn stop(&mut self) {
        (self.stop)()
    }
}
