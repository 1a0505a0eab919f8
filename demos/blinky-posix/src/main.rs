//! Blinky on Linux (POSIX)
//!
//! Drives the software timer manager from a host thread the way a board
//! drives it from a timer interrupt:
//! - a ticker thread increments the shared time base at a fixed rate;
//! - the main thread owns the timer manager and polls `run`;
//! - a periodic timer toggles a virtual LED, another prints a status report;
//! - a one-shot timer ends the demo, as does Ctrl-C.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use swtimer_manager::{TimeBase, TimerHandle, TimerManager, TimerMode};
use swtimer_posix::{StdMutexLock, StdTimeBase, Ticker, TickerConfig};
use tracing_subscriber::filter::LevelFilter;

static LED_ON: AtomicBool = AtomicBool::new(false);
static TOGGLES: AtomicU32 = AtomicU32::new(0);
static REPORT_DUE: AtomicBool = AtomicBool::new(false);
static TIME_UP: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(author, version, about = "Software timer demo driven by a POSIX ticker thread")]
struct Opts {
    /// Tick rate of the ticker thread
    #[arg(long, default_value_t = 1_000, value_name = "HZ")]
    rate_hz: u32,

    /// LED toggle period
    #[arg(long, default_value_t = 500, value_name = "MS")]
    blink_ms: u64,

    /// Status report period
    #[arg(long, default_value_t = 2_000, value_name = "MS")]
    report_ms: u64,

    /// Stop after this long
    #[arg(long, default_value_t = 10_000, value_name = "MS")]
    run_ms: u64,

    /// Log timer lifecycle and expiries
    #[arg(short, long)]
    verbose: bool,
}

fn on_blink(_timer: TimerHandle) {
    let on = !LED_ON.fetch_xor(true, Ordering::Relaxed);
    TOGGLES.fetch_add(1, Ordering::Relaxed);
    info!("LED {}", if on { "ON" } else { "OFF" });
}

fn on_report(_timer: TimerHandle) {
    REPORT_DUE.store(true, Ordering::Relaxed);
}

fn on_time_up(_timer: TimerHandle) {
    TIME_UP.store(true, Ordering::Relaxed);
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_max_level(if opts.verbose {
            LevelFilter::TRACE
        } else {
            LevelFilter::INFO
        })
        .init();

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("installing Ctrl-C handler")?;
    }

    let config = TickerConfig::builder()
        .rate_hz(opts.rate_hz)
        .name("blinky-tick")
        .build();
    let clock = config.clock();

    let time_base: Arc<StdTimeBase> = Arc::new(TimeBase::new(StdMutexLock::new()));
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&*time_base)?;

    let blink = timers.create(on_blink)?;
    let report = timers.create(on_report)?;
    let time_up = timers.create(on_time_up)?;
    timers.start(blink, clock.ticks_in(Duration::from_millis(opts.blink_ms)), TimerMode::Periodic)?;
    timers.start(report, clock.ticks_in(Duration::from_millis(opts.report_ms)), TimerMode::Periodic)?;
    timers.start(time_up, clock.ticks_in(Duration::from_millis(opts.run_ms)), TimerMode::OneShot)?;

    let ticker = Ticker::spawn(Arc::clone(&time_base), config).context("starting ticker")?;
    info!("ticking at {} Hz, press Ctrl-C to quit", opts.rate_hz);

    while !stop.load(Ordering::SeqCst) && !TIME_UP.load(Ordering::Relaxed) {
        timers.run();

        if REPORT_DUE.swap(false, Ordering::Relaxed) {
            let stats = timers.stats();
            info!(
                "{} | {} toggles | {}/{} timers armed | blink due in {} ticks",
                timers.now()?,
                TOGGLES.load(Ordering::Relaxed),
                stats.armed,
                stats.capacity,
                timers.remaining(blink)?.unwrap_or(0),
            );
        }

        thread::sleep(Duration::from_millis(1));
    }

    ticker.stop();
    for timer in [blink, report, time_up] {
        timers.delete(&mut Some(timer))?;
    }
    timers.uninit()?;

    info!(
        "stopped after {} LED toggles",
        TOGGLES.load(Ordering::Relaxed)
    );
    Ok(())
}
