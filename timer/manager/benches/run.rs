use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swtimer_core::CriticalSectionLock;
use swtimer_manager::{TimeBase, TimerHandle, TimerManager, TimerMode, MAX_TIMER_COUNT};

fn on_expiry(handle: TimerHandle) {
    black_box(handle);
}

fn run_full_pool(c: &mut Criterion) {
    let time_base = TimeBase::new(CriticalSectionLock);
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    for period in 1..=MAX_TIMER_COUNT as u32 {
        let timer = timers.create(on_expiry).unwrap();
        timers.start(timer, period, TimerMode::Periodic).unwrap();
    }

    c.bench_function("run_full_pool", |b| {
        b.iter(|| {
            time_base.increment().unwrap();
            black_box(timers.run())
        })
    });
}

fn increment_time_base(c: &mut Criterion) {
    let time_base = TimeBase::new(CriticalSectionLock);
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    c.bench_function("increment_time_base", |b| {
        b.iter(|| time_base.increment().unwrap())
    });
}

criterion_group!(benches, run_full_pool, increment_time_base);
criterion_main!(benches);
