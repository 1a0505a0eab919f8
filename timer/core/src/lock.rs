//! Tick counter locking
//!
//! The tick counter is the only state shared between the context that
//! advances time (usually an interrupt handler) and the context that
//! dispatches expired timers (usually the main loop). Pool slots are only
//! ever touched from the dispatch context and are not covered by the lock.
//!
//! The timer layer never picks a primitive itself. It asks the injected
//! [`TickLock`] to run a short closure and names the call site through
//! [`TickContext`], so a backend may mask only the tick interrupt from the
//! dispatch side and do nothing from inside the interrupt.

/// Call site requesting the tick counter lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickContext {
    /// Counter increment, from the tick source
    Increment,
    /// Counter read, from the dispatch loop
    Dispatch,
}

impl TickContext {
    /// Check if the lock is requested from the dispatch path
    pub const fn is_dispatch(self) -> bool {
        matches!(self, Self::Dispatch)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TickContext {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Increment => defmt::write!(fmt, "Increment"),
            Self::Dispatch => defmt::write!(fmt, "Dispatch"),
        }
    }
}

/// Synchronization around tick counter accesses
pub trait TickLock {
    /// Run `f` with the counter protected against the other context
    fn with_lock<R>(&self, context: TickContext, f: impl FnOnce() -> R) -> R;
}

impl<L: TickLock> TickLock for &L {
    fn with_lock<R>(&self, context: TickContext, f: impl FnOnce() -> R) -> R {
        (**self).with_lock(context, f)
    }
}

/// Lock driven by a plain callback
///
/// The callback receives `(is_lock_requested, is_in_run_context)`: `true`
/// then `false` for the first argument around each access, and `true` for
/// the second argument when the access comes from the dispatch loop.
///
/// ```
/// use swtimer_core::{LockCallback, TickContext, TickLock};
///
/// fn board_lock(acquire: bool, in_run_context: bool) {
///     // Mask the tick interrupt from the main loop only.
///     let _ = (acquire, in_run_context);
/// }
///
/// let lock = LockCallback::new(board_lock);
/// let value = lock.with_lock(TickContext::Dispatch, || 42);
/// assert_eq!(value, 42);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LockCallback<F>(F);

impl<F> LockCallback<F>
where
    F: Fn(bool, bool),
{
    /// Wrap a `(is_lock_requested, is_in_run_context)` callback
    pub const fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F> TickLock for LockCallback<F>
where
    F: Fn(bool, bool),
{
    fn with_lock<R>(&self, context: TickContext, f: impl FnOnce() -> R) -> R {
        let in_run_context = context.is_dispatch();
        (self.0)(true, in_run_context);
        let result = f();
        (self.0)(false, in_run_context);
        result
    }
}

/// No synchronization
///
/// Only correct when the increment and the dispatch run in the same context,
/// or when the platform reads and writes 32-bit words atomically and a torn
/// increment cannot happen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

impl TickLock for NoLock {
    fn with_lock<R>(&self, _context: TickContext, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// Lock backed by the `critical-section` crate
///
/// Uses whatever critical section implementation the final binary links
/// (interrupt masking on single-core targets, a global mutex on hosts).
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalSectionLock;

impl TickLock for CriticalSectionLock {
    fn with_lock<R>(&self, _context: TickContext, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}

/// Lock that masks all interrupts on Cortex-M cores
///
/// From inside the tick interrupt the counter is already exclusive, so only
/// the dispatch side masks interrupts.
#[cfg(target_arch = "arm")]
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptFreeLock;

#[cfg(target_arch = "arm")]
impl TickLock for InterruptFreeLock {
    fn with_lock<R>(&self, context: TickContext, f: impl FnOnce() -> R) -> R {
        match context {
            TickContext::Dispatch => cortex_m::interrupt::free(|_| f()),
            TickContext::Increment => f(),
        }
    }
}
