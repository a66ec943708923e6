//! Deterministic tick sources for tests and simulation

use std::sync::Arc;

use lapse_core::{Tick, TimeSource};
use parking_lot::Mutex;

/// Tick counter moved only by hand.
///
/// Clones share the same counter, so one handle can drive every timer built
/// on the others.
#[derive(Clone, Debug, Default)]
pub struct ManualClock<T> {
    value: Arc<Mutex<T>>,
}

impl<T: Tick> ManualClock<T> {
    /// Create a clock reading `start`
    pub fn new(start: T) -> Self {
        ManualClock {
            value: Arc::new(Mutex::new(start)),
        }
    }

    /// Current counter value
    pub fn get(&self) -> T {
        *self.value.lock()
    }

    /// Jump to `value`
    pub fn set(&self, value: T) {
        *self.value.lock() = value;
    }

    /// Move forward by `ticks`, wrapping at the counter width.
    /// Returns the new value.
    pub fn advance(&self, ticks: T) -> T {
        let mut value = self.value.lock();
        *value = value.wrapping_add(ticks);
        *value
    }
}

impl<T: Tick> TimeSource for ManualClock<T> {
    type Tick = T;

    #[inline]
    fn now(&mut self) -> T {
        self.get()
    }
}

/// Tick counter that moves forward by a fixed step on every read
#[derive(Clone, Debug)]
pub struct SteppingClock<T> {
    value: T,
    step: T,
}

impl<T: Tick> SteppingClock<T> {
    pub fn new(start: T, step: T) -> Self {
        SteppingClock { value: start, step }
    }

    /// Value the next read will return
    pub fn peek(&self) -> T {
        self.value
    }
}

impl<T: Tick> TimeSource for SteppingClock<T> {
    type Tick = T;

    fn now(&mut self) -> T {
        let now = self.value;
        self.value = self.value.wrapping_add(self.step);
        now
    }
}
