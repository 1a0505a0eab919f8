//! Timer manager tests for swtimer-manager

use std::cell::RefCell;

use swtimer_core::{LockCallback, NoLock};
use swtimer_manager::{
    Tick, TimeBase, TimerError, TimerHandle, TimerManager, TimerMode, TimerState, MAX_TIMER_COUNT,
};

type RecordingLock = LockCallback<fn(bool, bool)>;

thread_local! {
    static FIRED: RefCell<Vec<TimerHandle>> = const { RefCell::new(Vec::new()) };
    static LOCK_CALLS: RefCell<Vec<(bool, bool)>> = const { RefCell::new(Vec::new()) };
}

fn on_expiry(handle: TimerHandle) {
    FIRED.with(|fired| fired.borrow_mut().push(handle));
}

fn record_lock(is_lock_requested: bool, is_in_run_context: bool) {
    LOCK_CALLS.with(|calls| calls.borrow_mut().push((is_lock_requested, is_in_run_context)));
}

fn take_fired() -> Vec<TimerHandle> {
    FIRED.with(|fired| fired.borrow_mut().drain(..).collect())
}

fn take_lock_calls() -> Vec<(bool, bool)> {
    LOCK_CALLS.with(|calls| calls.borrow_mut().drain(..).collect())
}

fn recording_time_base() -> TimeBase<RecordingLock> {
    take_fired();
    take_lock_calls();
    TimeBase::new(LockCallback::new(record_lock as fn(bool, bool)))
}

fn tick(time_base: &TimeBase<RecordingLock>, count: u32) {
    for _ in 0..count {
        time_base.increment().unwrap();
    }
}

#[test]
fn test_init_twice() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    assert!(timers.init(&time_base).is_ok());
    assert_eq!(timers.init(&time_base), Err(TimerError::AlreadyInitialized));
    assert!(timers.is_initialized());
}

#[test]
fn test_time_base_serves_one_manager() {
    let time_base = recording_time_base();
    let mut first: TimerManager<'_, _> = TimerManager::new();
    let mut second: TimerManager<'_, _, 4> = TimerManager::new();

    first.init(&time_base).unwrap();
    assert_eq!(second.init(&time_base), Err(TimerError::AlreadyInitialized));

    first.uninit().unwrap();
    assert!(second.init(&time_base).is_ok());
}

#[test]
fn test_uninit_twice() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    assert_eq!(timers.uninit(), Err(TimerError::NotInitialized));

    timers.init(&time_base).unwrap();
    assert!(timers.uninit().is_ok());
    assert_eq!(timers.uninit(), Err(TimerError::NotInitialized));
}

#[test]
fn test_calls_before_init_are_refused() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();

    assert_eq!(timers.run(), 0);
    assert!(take_lock_calls().is_empty());
    assert_eq!(timers.create(on_expiry), Err(TimerError::NotInitialized));
    assert_eq!(timers.increment_time_base(), Err(TimerError::NotInitialized));
    assert_eq!(time_base.increment(), Err(TimerError::NotInitialized));
    assert_eq!(timers.uninit(), Err(TimerError::NotInitialized));
    assert!(take_lock_calls().is_empty());

    timers.init(&time_base).unwrap();
    let timer = timers.create(on_expiry).unwrap();
    timers.uninit().unwrap();

    let mut handle = Some(timer);
    assert_eq!(timers.stop(timer), Err(TimerError::NotInitialized));
    assert_eq!(
        timers.start(timer, 1, TimerMode::OneShot),
        Err(TimerError::NotInitialized)
    );
    assert_eq!(timers.delete(&mut handle), Err(TimerError::NotInitialized));
    assert_eq!(handle, Some(timer));
    assert_eq!(timers.state(timer), Err(TimerError::NotInitialized));
    assert_eq!(timers.remaining(timer), Err(TimerError::NotInitialized));
}

#[test]
fn test_run_locks_in_run_context() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();
    assert!(take_lock_calls().is_empty());

    timers.run();
    assert_eq!(take_lock_calls(), vec![(true, true), (false, true)]);
}

#[test]
fn test_increment_locks_outside_run_context() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();
    assert!(take_lock_calls().is_empty());

    assert!(timers.increment_time_base().is_ok());
    assert_eq!(take_lock_calls(), vec![(true, false), (false, false)]);
}

#[test]
fn test_start_locks_in_run_context() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();
    let timer = timers.create(on_expiry).unwrap();
    assert!(take_lock_calls().is_empty());

    timers.start(timer, 5, TimerMode::OneShot).unwrap();
    assert_eq!(take_lock_calls(), vec![(true, true), (false, true)]);
}

#[test]
fn test_invalid_start_makes_no_lock_calls() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();
    let timer = timers.create(on_expiry).unwrap();
    timers.delete(&mut Some(timer)).unwrap();
    assert!(take_lock_calls().is_empty());

    assert_eq!(
        timers.start(timer, 5, TimerMode::Periodic),
        Err(TimerError::InvalidHandle)
    );
    assert!(take_lock_calls().is_empty());
}

#[test]
fn test_stale_handle_rejected_after_slot_reuse() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _, 1> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let stale = timers.create(on_expiry).unwrap();
    timers.delete(&mut Some(stale)).unwrap();
    for _ in 0..u16::MAX {
        let timer = timers.create(on_expiry).unwrap();
        timers.delete(&mut Some(timer)).unwrap();
    }

    let fresh = timers.create(on_expiry).unwrap();
    timers.start(fresh, 5, TimerMode::OneShot).unwrap();
    assert_ne!(fresh, stale);
    assert_eq!(timers.stop(stale), Err(TimerError::InvalidHandle));
    assert_eq!(timers.state(fresh), Ok(TimerState::Armed));
}

#[test]
fn test_create_too_many_then_reuse() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let mut handles: Vec<_> = (0..MAX_TIMER_COUNT)
        .map(|_| timers.create(on_expiry).unwrap())
        .collect();
    assert_eq!(timers.create(on_expiry), Err(TimerError::PoolExhausted));

    let mut freed = Some(handles.remove(3));
    timers.delete(&mut freed).unwrap();
    let reused = timers.create(on_expiry).unwrap();
    assert_eq!(reused.slot(), 3);
}

#[test]
fn test_delete_empty_handle() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();
    timers.create(on_expiry).unwrap();
    let before = timers.stats();

    let mut handle = None;
    assert_eq!(timers.delete(&mut handle), Err(TimerError::InvalidHandle));
    assert_eq!(timers.stats(), before);
}

#[test]
fn test_delete_clears_handle() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    let mut handle = Some(timer);
    assert!(timers.delete(&mut handle).is_ok());
    assert_eq!(handle, None);

    // A copy kept elsewhere is stale now.
    let mut copy = Some(timer);
    assert_eq!(timers.delete(&mut copy), Err(TimerError::InvalidHandle));
    assert_eq!(timers.start(timer, 5, TimerMode::OneShot), Err(TimerError::InvalidHandle));
    assert_eq!(timers.stop(timer), Err(TimerError::InvalidHandle));
}

#[test]
fn test_periodic_timer() {
    const TICK_COUNT: u32 = 5;
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    timers.start(timer, TICK_COUNT, TimerMode::Periodic).unwrap();

    // Ticks alone never fire anything.
    tick(&time_base, TICK_COUNT);
    assert!(take_fired().is_empty());

    assert_eq!(timers.run(), 1);
    assert_eq!(take_fired(), vec![timer]);

    tick(&time_base, TICK_COUNT - 1);
    assert_eq!(timers.run(), 0);
    tick(&time_base, 1);
    assert_eq!(timers.run(), 1);
    assert_eq!(take_fired(), vec![timer]);
    assert_eq!(timers.state(timer), Ok(TimerState::Armed));
}

#[test]
fn test_two_periodic_timers() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer1 = timers.create(on_expiry).unwrap();
    let timer2 = timers.create(on_expiry).unwrap();
    timers.start(timer1, 5, TimerMode::Periodic).unwrap();
    timers.start(timer2, 4, TimerMode::Periodic).unwrap();

    let mut fired_at = Vec::new();
    for now in 1..=20u32 {
        tick(&time_base, 1);
        timers.run();
        for handle in take_fired() {
            fired_at.push((now, handle));
        }
    }

    assert_eq!(
        fired_at,
        vec![
            (4, timer2),
            (5, timer1),
            (8, timer2),
            (10, timer1),
            (12, timer2),
            (15, timer1),
            (16, timer2),
            (20, timer1),
            (20, timer2),
        ]
    );
}

#[test]
fn test_one_shot_timer() {
    const TICK_COUNT: u32 = 5;
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    timers.start(timer, TICK_COUNT, TimerMode::OneShot).unwrap();

    tick(&time_base, TICK_COUNT);
    assert_eq!(timers.run(), 1);
    assert_eq!(take_fired(), vec![timer]);
    assert_eq!(timers.state(timer), Ok(TimerState::Idle));

    tick(&time_base, TICK_COUNT);
    assert_eq!(timers.run(), 0);
    assert!(take_fired().is_empty());
}

#[test]
fn test_stop_prevents_expiry() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    timers.start(timer, 5, TimerMode::Periodic).unwrap();
    assert!(timers.stop(timer).is_ok());
    assert!(timers.stop(timer).is_ok());

    for _ in 0..50 {
        tick(&time_base, 1);
        timers.run();
    }
    assert!(take_fired().is_empty());
    assert_eq!(timers.remaining(timer), Ok(None));
}

#[test]
fn test_restart_counts_from_now() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    timers.start(timer, 5, TimerMode::OneShot).unwrap();
    tick(&time_base, 4);
    timers.start(timer, 5, TimerMode::OneShot).unwrap();
    assert_eq!(timers.remaining(timer), Ok(Some(5)));

    tick(&time_base, 4);
    assert_eq!(timers.run(), 0);
    tick(&time_base, 1);
    assert_eq!(timers.run(), 1);
}

#[test]
fn test_counter_wraparound() {
    take_fired();
    let time_base = TimeBase::starting_at(NoLock, Tick::new(u32::MAX - 2));
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    timers.start(timer, 10, TimerMode::OneShot).unwrap();

    for _ in 0..9 {
        time_base.increment().unwrap();
        assert_eq!(timers.run(), 0);
    }
    assert_eq!(timers.now(), Ok(Tick::new(6)));

    time_base.increment().unwrap();
    assert_eq!(timers.run(), 1);
    assert_eq!(take_fired(), vec![timer]);
}

#[test]
fn test_timers_survive_uninit() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    timers.start(timer, 3, TimerMode::OneShot).unwrap();
    timers.uninit().unwrap();

    assert_eq!(timers.stats().armed, 1);
    assert_eq!(time_base.increment(), Err(TimerError::NotInitialized));
    assert_eq!(timers.run(), 0);

    timers.init(&time_base).unwrap();
    tick(&time_base, 3);
    assert_eq!(timers.run(), 1);
    assert_eq!(take_fired(), vec![timer]);
}

#[test]
fn test_late_run_fires_once_per_call() {
    let time_base = recording_time_base();
    let mut timers: TimerManager<'_, _> = TimerManager::new();
    timers.init(&time_base).unwrap();

    let timer = timers.create(on_expiry).unwrap();
    timers.start(timer, 2, TimerMode::Periodic).unwrap();
    tick(&time_base, 9);

    assert_eq!(timers.run(), 1);
    assert_eq!(timers.run(), 0);
    assert_eq!(timers.remaining(timer), Ok(Some(2)));
}
