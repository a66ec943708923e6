//! End-to-end Integration Suite
//!
//! Exercises timers the way a host firmware loop does:
//! - several timers sharing one clock, started and sampled at one instant
//! - long runs across counter wraparound
//! - recovery from accumulator overflow by restarting

use lapse_core::Tick;
use lapse_time::{ElapsedTimer, Sample};

use crate::clock::ManualClock;

/// Group of timers driven from a single clock read per operation, so they
/// never skew against each other.
pub struct SynchronizedTimers<T: Tick> {
    clock: ManualClock<T>,
    timers: Vec<ElapsedTimer<ManualClock<T>>>,
}

impl<T: Tick> SynchronizedTimers<T> {
    /// Create `count` stopped timers on `clock`
    pub fn new(clock: ManualClock<T>, count: usize) -> Self {
        let timers = (0..count)
            .map(|_| ElapsedTimer::new(clock.clone()))
            .collect();
        SynchronizedTimers { clock, timers }
    }

    /// Start every timer at one sampled tick. Returns that tick.
    pub fn start_all(&mut self) -> T {
        let now = self.clock.get();
        for timer in &mut self.timers {
            timer.clear_and_start(Some(now));
        }
        now
    }

    /// Running time of every timer at one sampled tick
    pub fn sample_all(&mut self) -> Vec<T> {
        let now = self.clock.get();
        self.timers
            .iter_mut()
            .map(|timer| timer.elapsed(Sample::At(now)))
            .collect()
    }

    pub fn timer(&self, index: usize) -> Option<&ElapsedTimer<ManualClock<T>>> {
        self.timers.get(index)
    }

    pub fn timer_mut(&mut self, index: usize) -> Option<&mut ElapsedTimer<ManualClock<T>>> {
        self.timers.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lapse_core::{TimerError, TimerState};

    #[test]
    fn test_documented_scenario_on_manual_clock() {
        let clock = ManualClock::new(0u32);
        let mut timer = ElapsedTimer::new(clock.clone());

        timer.clear_and_start(None);
        clock.set(100);
        assert_eq!(timer.elapsed(Sample::Now), 100);

        clock.set(150);
        assert_eq!(timer.pause(Sample::Now), 150);
        assert_eq!(timer.state(), TimerState::Paused);

        clock.set(180);
        assert_eq!(timer.elapsed(Sample::Cached), 150);
        assert_eq!(timer.elapsed(Sample::Now), 150);

        clock.set(200);
        assert_eq!(timer.resume(None), 150);
        assert_eq!(timer.state(), TimerState::Resumed);

        clock.set(250);
        assert_eq!(timer.elapsed(Sample::Now), 200);
        assert_eq!(timer.elapsed_since_start(), 250);
    }

    #[test]
    fn test_synchronized_timers_do_not_skew() {
        let clock = ManualClock::new(1_000u32);
        let mut group = SynchronizedTimers::new(clock.clone(), 3);
        assert_eq!(group.start_all(), 1_000);

        clock.advance(250);
        assert_eq!(group.sample_all(), vec![250, 250, 250]);

        let second = group.timer_mut(1).unwrap();
        second.pause(Sample::Cached);

        clock.advance(100);
        assert_eq!(group.sample_all(), vec![350, 250, 350]);

        group.timer_mut(1).unwrap().resume(None);
        clock.advance(50);
        assert_eq!(group.sample_all(), vec![400, 300, 400]);
        assert_eq!(group.timer(1).unwrap().elapsed_since_start(), 400);
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_hours_on_wrapping_microsecond_counter() {
        // A 32-bit microsecond counter wraps about every 71.6 minutes;
        // one-minute segments stay well inside a period.
        let clock = ManualClock::new(u32::MAX - 5_000_000);
        let mut timer = ElapsedTimer::started(clock.clone());

        let second = 1_000_000u32;
        let mut running = 0u32;
        let mut wraps = 0;
        for minute in 0..60 {
            for _ in 0..60 {
                let before = clock.get();
                if clock.advance(second) < before {
                    wraps += 1;
                }
                if minute % 2 == 0 {
                    running += second;
                }
                timer.elapsed(Sample::Now);
            }
            if minute % 2 == 0 {
                timer.pause(Sample::Now);
            } else {
                timer.resume(None);
            }
        }

        assert_eq!(wraps, 1);
        assert_eq!(timer.overflow_count(), 0);
        assert_eq!(timer.elapsed(Sample::Cached), running);
        assert_eq!(running, 30 * 60 * second);
    }

    #[test]
    fn test_restart_recovers_from_overflow() {
        let clock = ManualClock::new(0u16);
        let mut timer = ElapsedTimer::started(clock.clone());

        for _ in 0..2 {
            clock.advance(30_000);
            timer.pause(Sample::Now);
            timer.resume(None);
        }
        assert_eq!(timer.overflow_count(), 0);

        clock.advance(10_000);
        assert_eq!(
            timer.try_elapsed(Sample::Now),
            Err(TimerError::Overflow { count: 1 })
        );
        assert_eq!(timer.elapsed_since_start(), 0);

        timer.clear_and_start(None);
        clock.advance(1_234);
        assert_eq!(timer.elapsed(Sample::Now), 1_234);
        assert_eq!(timer.overflow_count(), 0);
    }
}
