//! Clock tick thread for POSIX
//!
//! Stands in for the hardware tick interrupt: a dedicated thread increments
//! a [`TimeBase`] at a fixed rate. Sleeps target absolute deadlines on the
//! monotonic clock so the tick rate does not drift.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use swtimer_core::TickLock;
use swtimer_manager::TimeBase;
use thiserror::Error;

/// Default tick rate in Hz
pub const DEFAULT_TICKS_PER_SEC: u32 = 1_000;

/// Highest tick rate a host thread can sustain reliably
pub const MAX_TICKS_PER_SEC: u32 = 20_000;

/// Nanoseconds per second
const NSEC_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug, Error)]
pub enum TickerError {
    #[error("tick rate must be greater than 0")]
    ZeroRate,
    #[error("tick rate {0} Hz exceeds the {max} Hz limit", max = MAX_TICKS_PER_SEC)]
    RateTooHigh(u32),
    #[error("failed to spawn ticker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Clock tick period helper
#[derive(Debug, Clone, Copy)]
pub struct ClockTick {
    rate_hz: u32,
}

impl ClockTick {
    /// Create a new clock tick configuration
    pub fn new(rate_hz: u32) -> Self {
        ClockTick { rate_hz }
    }

    /// Get the tick period as a Duration, `None` for a zero rate
    pub fn period(&self) -> Option<Duration> {
        NSEC_PER_SEC
            .checked_div(self.rate_hz as u64)
            .map(Duration::from_nanos)
    }

    /// Get the number of whole ticks in `duration`
    pub fn ticks_in(&self, duration: Duration) -> u32 {
        let ticks = duration.as_nanos() * self.rate_hz as u128 / NSEC_PER_SEC as u128;
        ticks.min(u32::MAX as u128) as u32
    }
}

/// Ticker thread configuration
#[derive(Debug, Clone)]
pub struct TickerConfig {
    pub rate_hz: u32,
    pub name: String,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            rate_hz: DEFAULT_TICKS_PER_SEC,
            name: "swtimer-tick".to_string(),
        }
    }
}

impl TickerConfig {
    /// Creates a new ticker configuration builder.
    pub fn builder() -> TickerConfigBuilder {
        TickerConfigBuilder::default()
    }

    /// Check the tick rate is usable
    pub fn validate(&self) -> Result<(), TickerError> {
        match self.rate_hz {
            0 => Err(TickerError::ZeroRate),
            rate if rate > MAX_TICKS_PER_SEC => Err(TickerError::RateTooHigh(rate)),
            _ => Ok(()),
        }
    }

    /// Get the tick period helper for this rate
    pub fn clock(&self) -> ClockTick {
        ClockTick::new(self.rate_hz)
    }
}

/// Builder for ergonomic ticker configuration construction.
#[derive(Debug, Clone, Default)]
pub struct TickerConfigBuilder {
    config: TickerConfig,
}

impl TickerConfigBuilder {
    /// Sets the tick rate in Hz.
    pub fn rate_hz(mut self, rate_hz: u32) -> Self {
        self.config.rate_hz = rate_hz;
        self
    }

    /// Sets the ticker thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Builds the ticker configuration.
    pub fn build(self) -> TickerConfig {
        self.config
    }
}

/// Running ticker thread. Stops and joins on drop.
pub struct Ticker {
    config: TickerConfig,
    running: Arc<AtomicBool>,
    delivered: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn a thread incrementing `time_base` at the configured rate
    ///
    /// Ticks refused by the time base (no manager initialized) are dropped.
    pub fn spawn<L>(time_base: Arc<TimeBase<L>>, config: TickerConfig) -> Result<Self, TickerError>
    where
        L: TickLock + Send + Sync + 'static,
    {
        config.validate()?;

        let running = Arc::new(AtomicBool::new(true));
        let delivered = Arc::new(AtomicU64::new(0));
        let period = config.clock().period().ok_or(TickerError::ZeroRate)?;

        let thread = {
            let running = Arc::clone(&running);
            let delivered = Arc::clone(&delivered);
            thread::Builder::new()
                .name(config.name.clone())
                .spawn(move || ticker_thread(&*time_base, period, &running, &delivered))?
        };

        log::debug!("ticker '{}' started at {} Hz", config.name, config.rate_hz);
        Ok(Self {
            config,
            running,
            delivered,
            thread: Some(thread),
        })
    }

    /// Get the configuration the ticker runs with
    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Number of ticks the time base accepted so far
    pub fn ticks_delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Check if the thread is still ticking
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::warn!("ticker '{}' panicked", self.config.name);
            }
            log::debug!("ticker '{}' stopped after {} ticks", self.config.name, self.ticks_delivered());
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Ticker thread body
///
/// Sleeps until the next absolute tick deadline rather than for a relative
/// period, so time spent incrementing does not accumulate.
fn ticker_thread<L: TickLock>(
    time_base: &TimeBase<L>,
    period: Duration,
    running: &AtomicBool,
    delivered: &AtomicU64,
) {
    let mut next_tick = Instant::now();
    let mut refusing = false;

    while running.load(Ordering::Relaxed) {
        next_tick += period;

        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        }

        match time_base.increment() {
            Ok(()) => {
                delivered.fetch_add(1, Ordering::Relaxed);
                refusing = false;
            }
            Err(err) if !refusing => {
                log::debug!("tick dropped: {err}");
                refusing = true;
            }
            Err(_) => {}
        }
    }
}
