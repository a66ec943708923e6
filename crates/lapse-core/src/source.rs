//! The "read current tick" capability
//!
//! Timers never touch hardware directly. The host injects a time source,
//! normally bound to the platform's microsecond or millisecond counter.

use crate::Tick;

/// Something that can report the current value of a wrapping tick counter.
pub trait TimeSource {
    /// Counter type produced by this source
    type Tick: Tick;

    /// Sample the counter
    fn now(&mut self) -> Self::Tick;
}

/// Bare `fn() -> T` pointers and closures are time sources.
impl<F, T> TimeSource for F
where
    F: FnMut() -> T,
    T: Tick,
{
    type Tick = T;

    #[inline]
    fn now(&mut self) -> T {
        self()
    }
}
