//! Host tick source shaped like an embedded counter

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use lapse_core::{Tick, TimeSource};

/// Unit of one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Micros,
    Millis,
}

impl Resolution {
    /// Length of one tick
    pub fn tick_duration(self) -> Duration {
        match self {
            Resolution::Micros => Duration::from_micros(1),
            Resolution::Millis => Duration::from_millis(1),
        }
    }
}

/// Monotonic clock configuration
#[derive(Clone, Debug, Default)]
pub struct ClockConfig {
    /// Tick unit
    pub resolution: Resolution,
}

impl ClockConfig {
    pub fn micros() -> Self {
        ClockConfig {
            resolution: Resolution::Micros,
        }
    }

    pub fn millis() -> Self {
        ClockConfig {
            resolution: Resolution::Millis,
        }
    }
}

/// Tick counter over `std::time::Instant`.
///
/// Counts ticks since the clock was created and truncates them onto the
/// width of `T`, so a `MonotonicClock<u32>` wraps like a 32-bit hardware
/// microsecond counter (about every 71.6 minutes).
#[derive(Clone, Debug)]
pub struct MonotonicClock<T> {
    origin: Instant,
    config: ClockConfig,
    tick: PhantomData<fn() -> T>,
}

impl<T: Tick> MonotonicClock<T> {
    /// Create a clock with custom configuration
    pub fn with_config(config: ClockConfig) -> Self {
        MonotonicClock {
            origin: Instant::now(),
            config,
            tick: PhantomData,
        }
    }

    /// Microsecond counter starting at zero
    pub fn micros() -> Self {
        Self::with_config(ClockConfig::micros())
    }

    /// Millisecond counter starting at zero
    pub fn millis() -> Self {
        Self::with_config(ClockConfig::millis())
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Current counter value
    pub fn read(&self) -> T {
        let elapsed = self.origin.elapsed();
        let ticks = match self.config.resolution {
            Resolution::Micros => elapsed.as_micros(),
            Resolution::Millis => elapsed.as_millis(),
        };
        T::from_u128_wrapping(ticks)
    }

    /// Time after which the counter returns to zero.
    /// `None` when the period does not fit a `Duration` worth caring about.
    pub fn wrap_period(&self) -> Option<Duration> {
        if T::BITS >= 64 {
            return None;
        }
        let ticks = 1u64 << T::BITS;
        match self.config.resolution {
            Resolution::Micros => Some(Duration::from_micros(ticks)),
            Resolution::Millis => Some(Duration::from_millis(ticks)),
        }
    }
}

impl<T: Tick> TimeSource for MonotonicClock<T> {
    type Tick = T;

    #[inline]
    fn now(&mut self) -> T {
        self.read()
    }
}
