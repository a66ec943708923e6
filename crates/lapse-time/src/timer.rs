//! Elapsed Timer - running time over a wrapping tick counter
//!
//! The timer keeps two measurements:
//! - running time: the sum of every running segment, pauses excluded
//! - time since start: last sample minus the start tick, pauses included
//!
//! Interval arithmetic is modular, so the underlying counter may wrap between
//! samples. What the timer cannot tolerate is its own running total exceeding
//! the tick range; that is detected when the total is seen to decrease, and
//! stays recorded until the next `clear_and_start`.
//!
//! Quantity-returning operations come in two flavours. The plain ones
//! (`elapsed`, `pause`, `resume`, `elapsed_since_start`) return zero on any
//! failure, and callers disambiguate through `state()` and `overflow_count()`.
//! The `try_` ones perform the same mutations and report a [`TimerError`].

use std::fmt;

use lapse_core::{Tick, TimeSource, TimerError, TimerResult, TimerState};
use tracing::{debug, trace, warn};

/// How an operation obtains "now"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Sample<T> {
    /// Read the time source
    #[default]
    Now,
    /// Use a tick the caller already read, e.g. once for several timers
    At(T),
    /// Do not sample; observe only what was accumulated up to the last sample
    Cached,
}

impl<T: Tick> Sample<T> {
    /// Map the numeric tristate convention of embedded timer APIs:
    /// 0 keeps the cached value, 1 reads the clock, anything greater is
    /// taken as the tick itself.
    pub fn from_raw(raw: T) -> Self {
        if raw == T::ZERO {
            Sample::Cached
        } else if raw == T::ONE {
            Sample::Now
        } else {
            Sample::At(raw)
        }
    }

    /// Explicit tick carried by this sample
    #[inline]
    pub fn tick(self) -> Option<T> {
        match self {
            Sample::At(tick) => Some(tick),
            Sample::Now | Sample::Cached => None,
        }
    }
}

/// Copy of every field of an [`ElapsedTimer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSnapshot<T> {
    pub state: TimerState,
    /// Tick of the last start
    pub epoch_start: T,
    /// Tick of the last start or resume
    pub segment_start: T,
    /// Tick of the most recent sample
    pub last_sample: T,
    /// Running time of the current segment, as of `last_sample`
    pub segment_elapsed: T,
    /// Running time of all segments before the current one
    pub accumulated: T,
    /// `accumulated + segment_elapsed`
    pub running: T,
    pub overflows: u16,
}

/// Overflow-safe elapsed-time tracker.
///
/// State machine:
/// - `Stopped --clear_and_start--> Started`
/// - `Started | Resumed --pause--> Paused`
/// - `Paused --resume--> Resumed`
/// - any state `--clear_and_start--> Started`
///
/// There is no way back to `Stopped` once started.
pub struct ElapsedTimer<S: TimeSource> {
    source: S,
    state: TimerState,
    epoch_start: S::Tick,
    segment_start: S::Tick,
    last_sample: S::Tick,
    segment_elapsed: S::Tick,
    accumulated: S::Tick,
    running: S::Tick,
    overflows: u16,
}

impl<S: TimeSource> ElapsedTimer<S> {
    /// Create a stopped timer
    pub fn new(source: S) -> Self {
        ElapsedTimer {
            source,
            state: TimerState::Stopped,
            epoch_start: S::Tick::ZERO,
            segment_start: S::Tick::ZERO,
            last_sample: S::Tick::ZERO,
            segment_elapsed: S::Tick::ZERO,
            accumulated: S::Tick::ZERO,
            running: S::Tick::ZERO,
            overflows: 0,
        }
    }

    /// Create a timer started at the current tick of `source`
    pub fn started(source: S) -> Self {
        let mut timer = Self::new(source);
        timer.clear_and_start(None);
        timer
    }

    /// Create a timer started at `tick`, without reading the source
    pub fn started_at(source: S, tick: S::Tick) -> Self {
        let mut timer = Self::new(source);
        timer.clear_and_start(Some(tick));
        timer
    }

    /// Create a timer following the numeric `start_now` convention:
    /// 0 leaves it stopped, 1 starts it from the source, anything greater
    /// starts it at that tick.
    pub fn from_raw(start_now: S::Tick, source: S) -> Self {
        let mut timer = Self::new(source);
        if start_now != S::Tick::ZERO {
            timer.clear_and_start(Sample::from_raw(start_now).tick());
        }
        timer
    }

    /// Reset every accumulator and the overflow record, and start a new
    /// measurement at `at` (or the current tick when `None`).
    pub fn clear_and_start(&mut self, at: Option<S::Tick>) {
        let now = self.read(at);

        self.epoch_start = now;
        self.segment_start = now;
        self.last_sample = now;
        self.segment_elapsed = S::Tick::ZERO;
        self.accumulated = S::Tick::ZERO;
        self.running = S::Tick::ZERO;
        self.overflows = 0;

        trace!(from = %self.state, tick = %now, "timer started");
        self.state = TimerState::Started;
    }

    /// Running time since the last start, pauses excluded.
    ///
    /// Returns zero when stopped or after an accumulator overflow.
    pub fn elapsed(&mut self, sample: Sample<S::Tick>) -> S::Tick {
        self.try_elapsed(sample).unwrap_or(S::Tick::ZERO)
    }

    /// Running time since the last start, pauses excluded.
    ///
    /// While paused, or with `Sample::Cached`, the last computed value is
    /// reported without touching the source.
    pub fn try_elapsed(&mut self, sample: Sample<S::Tick>) -> TimerResult<S::Tick> {
        match self.state {
            TimerState::Stopped => return Err(TimerError::NotStarted),
            TimerState::Paused => return self.checked_running(),
            TimerState::Started | TimerState::Resumed => {}
        }

        let now = match sample {
            Sample::Cached => return self.checked_running(),
            Sample::At(tick) => tick,
            Sample::Now => self.source.now(),
        };
        self.update(now);
        self.checked_running()
    }

    /// Freeze running time and move to `Paused`.
    ///
    /// Returns the frozen value, or zero when the timer was not running or
    /// has overflowed.
    pub fn pause(&mut self, sample: Sample<S::Tick>) -> S::Tick {
        self.try_pause(sample).unwrap_or(S::Tick::ZERO)
    }

    /// Freeze running time and move to `Paused`.
    ///
    /// An overflowed timer still pauses before `Overflow` is reported.
    pub fn try_pause(&mut self, sample: Sample<S::Tick>) -> TimerResult<S::Tick> {
        if !self.state.is_running() {
            debug!(state = %self.state, "pause ignored");
            return Err(self.not_running());
        }

        match sample {
            Sample::Cached => {}
            Sample::At(tick) => self.update(tick),
            Sample::Now => {
                let now = self.source.now();
                self.update(now);
            }
        }

        trace!(from = %self.state, running = %self.running, "timer paused");
        self.state = TimerState::Paused;
        self.checked_running()
    }

    /// Start a new running segment at `at` (or the current tick when `None`)
    /// and move to `Resumed`.
    ///
    /// Returns the running time known before resuming, without sampling it
    /// again, or zero when the timer was not paused or has overflowed.
    pub fn resume(&mut self, at: Option<S::Tick>) -> S::Tick {
        self.try_resume(at).unwrap_or(S::Tick::ZERO)
    }

    /// Start a new running segment and move to `Resumed`.
    pub fn try_resume(&mut self, at: Option<S::Tick>) -> TimerResult<S::Tick> {
        if self.state != TimerState::Paused {
            debug!(state = %self.state, "resume ignored");
            return Err(match self.state {
                TimerState::Stopped => TimerError::NotStarted,
                state => TimerError::NotPaused { state },
            });
        }

        // accumulated + segment_elapsed equals the running total already
        // checked for overflow, so folding cannot overflow on its own.
        self.accumulated = self.accumulated.wrapping_add(self.segment_elapsed);
        self.segment_elapsed = S::Tick::ZERO;

        let now = self.read(at);
        self.segment_start = now;
        self.last_sample = now;

        trace!(tick = %now, running = %self.running, "timer resumed");
        self.state = TimerState::Resumed;
        self.checked_running()
    }

    /// Time from the last start to the last sample, pauses included.
    ///
    /// Only as fresh as the last `elapsed`, `pause` or `resume`; the source
    /// is not read. Zero unless running without overflow.
    pub fn elapsed_since_start(&self) -> S::Tick {
        self.try_elapsed_since_start().unwrap_or(S::Tick::ZERO)
    }

    pub fn try_elapsed_since_start(&self) -> TimerResult<S::Tick> {
        if !self.state.is_running() {
            return Err(self.not_running());
        }
        if self.overflows > 0 {
            return Err(TimerError::Overflow {
                count: self.overflows,
            });
        }
        Ok(self.last_sample.wrapping_sub(self.epoch_start))
    }

    #[inline]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Number of times running time was seen to decrease since the last
    /// start. Non-zero means every quantity query reports zero.
    #[inline]
    pub fn overflow_count(&self) -> u16 {
        self.overflows
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn snapshot(&self) -> TimerSnapshot<S::Tick> {
        TimerSnapshot {
            state: self.state,
            epoch_start: self.epoch_start,
            segment_start: self.segment_start,
            last_sample: self.last_sample,
            segment_elapsed: self.segment_elapsed,
            accumulated: self.accumulated,
            running: self.running,
            overflows: self.overflows,
        }
    }

    pub fn time_source(&self) -> &S {
        &self.source
    }

    pub fn time_source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_time_source(self) -> S {
        self.source
    }

    fn read(&mut self, at: Option<S::Tick>) -> S::Tick {
        match at {
            Some(tick) => tick,
            None => self.source.now(),
        }
    }

    /// Advance the current segment to `now` and recompute running time
    fn update(&mut self, now: S::Tick) {
        let segment_elapsed = now.wrapping_sub(self.segment_start);
        let running = segment_elapsed.wrapping_add(self.accumulated);

        if running < self.running {
            if self.overflows == 0 {
                warn!(
                    previous = %self.running,
                    computed = %running,
                    "running time overflowed tick range"
                );
            }
            self.overflows = self.overflows.saturating_add(1);
        }

        self.last_sample = now;
        self.segment_elapsed = segment_elapsed;
        self.running = running;
    }

    fn checked_running(&self) -> TimerResult<S::Tick> {
        if self.overflows > 0 {
            Err(TimerError::Overflow {
                count: self.overflows,
            })
        } else {
            Ok(self.running)
        }
    }

    fn not_running(&self) -> TimerError {
        match self.state {
            TimerState::Stopped => TimerError::NotStarted,
            state => TimerError::NotRunning { state },
        }
    }
}

impl<S: TimeSource> fmt::Debug for ElapsedTimer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElapsedTimer")
            .field("state", &self.state)
            .field("epoch_start", &self.epoch_start)
            .field("segment_start", &self.segment_start)
            .field("last_sample", &self.last_sample)
            .field("segment_elapsed", &self.segment_elapsed)
            .field("accumulated", &self.accumulated)
            .field("running", &self.running)
            .field("overflows", &self.overflows)
            .finish_non_exhaustive()
    }
}
