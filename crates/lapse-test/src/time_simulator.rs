//! Timer Simulator - randomized operation scripts against a reference model
//!
//! Drives an `ElapsedTimer` on a `ManualClock` with random advances,
//! samples, pauses, resumes and restarts, and checks every result against a
//! model that keeps absolute time in `u128` and never wraps:
//! - with no overflow recorded, results equal the model modulo the counter width
//! - an overflow is only ever recorded when true running time exceeds the range
//! - once an overflow is recorded, every query reports zero until restart

use std::collections::HashMap;

use lapse_core::{Tick, TimerState};
use lapse_time::{ElapsedTimer, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::ManualClock;

/// Operation applied in one simulation step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerOp {
    /// Move the clock forward
    Advance,
    /// `elapsed` reading the clock
    Elapsed,
    /// `elapsed` with a tick supplied by the caller
    ElapsedAt,
    /// `elapsed` without sampling
    ElapsedCached,
    Pause,
    PauseCached,
    Resume,
    /// `clear_and_start`
    Restart,
    SinceStart,
}

impl TimerOp {
    fn pick(rng: &mut StdRng, config: &SimulationConfig) -> Self {
        if rng.gen_bool(config.restart_probability) {
            return TimerOp::Restart;
        }
        match rng.gen_range(0..16) {
            0..=5 => TimerOp::Advance,
            6 | 7 => TimerOp::Elapsed,
            8 => TimerOp::ElapsedAt,
            9 => TimerOp::ElapsedCached,
            10 => TimerOp::Pause,
            11 => TimerOp::PauseCached,
            12 | 13 => TimerOp::Resume,
            _ => TimerOp::SinceStart,
        }
    }
}

/// Simulation parameters
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Number of operations to run
    pub steps: usize,
    /// Largest single clock advance, in ticks
    pub max_advance: u128,
    /// Chance that a step is a restart
    pub restart_probability: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            steps: 10_000,
            max_advance: 1_000,
            restart_probability: 0.002,
            seed: 0,
        }
    }
}

/// Unbounded mirror of the timer's arithmetic
#[derive(Clone, Debug, Default)]
struct ReferenceModel {
    state: TimerState,
    epoch_start: u128,
    segment_start: u128,
    last_sample: u128,
    accumulated: u128,
    running: u128,
}

impl ReferenceModel {
    fn start(&mut self, now: u128) {
        *self = ReferenceModel {
            state: TimerState::Started,
            epoch_start: now,
            segment_start: now,
            last_sample: now,
            accumulated: 0,
            running: 0,
        };
    }

    fn update(&mut self, now: u128) {
        self.last_sample = now;
        self.running = self.accumulated + (now - self.segment_start);
    }

    fn resume(&mut self, now: u128) {
        self.accumulated = self.running;
        self.segment_start = now;
        self.last_sample = now;
        self.state = TimerState::Resumed;
    }
}

/// Timer under test plus its model and clock
pub struct TimerSimulator<T: Tick> {
    timer: ElapsedTimer<ManualClock<T>>,
    clock: ManualClock<T>,
    model: ReferenceModel,
    /// Absolute simulated time, never wraps
    now: u128,
    config: SimulationConfig,
    rng: StdRng,
}

impl<T: Tick> TimerSimulator<T> {
    /// Create a simulator whose clock starts at `start`
    pub fn new(start: T, config: SimulationConfig) -> Self {
        let clock = ManualClock::new(start);
        TimerSimulator {
            timer: ElapsedTimer::new(clock.clone()),
            clock,
            model: ReferenceModel::default(),
            now: start.into_u128(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Run the configured number of steps
    pub fn run(&mut self) -> SimulationResult {
        let mut result = SimulationResult::new();
        for _ in 0..self.config.steps {
            let op = TimerOp::pick(&mut self.rng, &self.config);
            self.step(op, &mut result);
        }
        result
    }

    /// Apply one operation and check it
    pub fn step(&mut self, op: TimerOp, result: &mut SimulationResult) {
        result.total_steps += 1;
        *result.op_counts.entry(op).or_insert(0) += 1;

        match op {
            TimerOp::Advance => {
                let max = self.config.max_advance.clamp(1, T::MAX.into_u128());
                let ticks = self.rng.gen_range(1..=max);
                let before = self.clock.get();
                self.now += ticks;
                let after = self.clock.advance(T::from_u128_wrapping(ticks));
                if after < before {
                    result.counter_wraps += 1;
                }
            }
            TimerOp::Elapsed | TimerOp::ElapsedAt | TimerOp::ElapsedCached => {
                let sample = match op {
                    TimerOp::Elapsed => Sample::Now,
                    TimerOp::ElapsedAt => Sample::At(self.clock.get()),
                    _ => Sample::Cached,
                };
                let got = self.timer.elapsed(sample);
                let expected = match self.model.state {
                    TimerState::Stopped => Some(0),
                    TimerState::Paused => None,
                    TimerState::Started | TimerState::Resumed => {
                        if op != TimerOp::ElapsedCached {
                            self.model.update(self.now);
                        }
                        None
                    }
                };
                self.check_quantity(op, got, expected, result);
            }
            TimerOp::Pause | TimerOp::PauseCached => {
                let sample = if op == TimerOp::Pause {
                    Sample::Now
                } else {
                    Sample::Cached
                };
                let got = self.timer.pause(sample);
                let expected = if self.model.state.is_running() {
                    if op == TimerOp::Pause {
                        self.model.update(self.now);
                    }
                    self.model.state = TimerState::Paused;
                    None
                } else {
                    Some(0)
                };
                self.check_quantity(op, got, expected, result);
            }
            TimerOp::Resume => {
                let got = self.timer.resume(None);
                let expected = if self.model.state == TimerState::Paused {
                    self.model.resume(self.now);
                    None
                } else {
                    Some(0)
                };
                self.check_quantity(op, got, expected, result);
            }
            TimerOp::Restart => {
                self.timer.clear_and_start(None);
                self.model.start(self.now);
                if self.timer.overflow_count() != 0 || self.timer.elapsed_since_start() != T::ZERO {
                    result.violation(op, "restart left residual state");
                }
            }
            TimerOp::SinceStart => {
                let got = self.timer.elapsed_since_start();
                let expected = if self.model.state.is_running() && self.timer.overflow_count() == 0 {
                    T::from_u128_wrapping(self.model.last_sample - self.model.epoch_start)
                } else {
                    T::ZERO
                };
                if got != expected {
                    result.violation(op, format!("since start {} != expected {}", got, expected));
                }
            }
        }

        if self.timer.state() != self.model.state {
            result.violation(
                op,
                format!("state {} != expected {}", self.timer.state(), self.model.state),
            );
        }
        if self.model.running > T::MAX.into_u128() && self.timer.overflow_count() == 0 {
            result.undetected_overflow_steps += 1;
        }
        result.max_running = result.max_running.max(self.model.running);
    }

    /// `fixed` overrides the model's running time for no-op outcomes
    fn check_quantity(&self, op: TimerOp, got: T, fixed: Option<u128>, result: &mut SimulationResult) {
        let overflows = self.timer.overflow_count();

        if overflows > 0 {
            result.overflow_steps += 1;
            if self.model.running <= T::MAX.into_u128() {
                result.violation(
                    op,
                    format!("overflow recorded at running time {}", self.model.running),
                );
            }
            if got != T::ZERO {
                result.violation(op, format!("overflowed timer returned {}", got));
            }
            return;
        }

        let expected = T::from_u128_wrapping(fixed.unwrap_or(self.model.running));
        if got != expected {
            result.violation(op, format!("returned {} != expected {}", got, expected));
        }
    }

    pub fn timer(&self) -> &ElapsedTimer<ManualClock<T>> {
        &self.timer
    }

    pub fn clock(&self) -> &ManualClock<T> {
        &self.clock
    }

    /// Absolute simulated time
    pub fn now(&self) -> u128 {
        self.now
    }
}

/// Simulation outcome and statistics
#[derive(Debug, Default)]
pub struct SimulationResult {
    /// Total steps executed
    pub total_steps: u64,
    /// Steps per operation
    pub op_counts: HashMap<TimerOp, u64>,
    /// Times the underlying counter wrapped
    pub counter_wraps: u64,
    /// Quantity queries answered while an overflow was recorded
    pub overflow_steps: u64,
    /// Steps where true running time exceeded the range without the timer noticing yet
    pub undetected_overflow_steps: u64,
    /// Largest true running time seen
    pub max_running: u128,
    /// Mismatches between timer and model
    pub violations: Vec<String>,
}

impl SimulationResult {
    pub fn new() -> Self {
        SimulationResult::default()
    }

    fn violation(&mut self, op: TimerOp, detail: impl Into<String>) {
        self.violations
            .push(format!("step {} {:?}: {}", self.total_steps, op, detail.into()));
    }

    /// No mismatches recorded
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, op: TimerOp) -> u64 {
        self.op_counts.get(&op).copied().unwrap_or(0)
    }
}

/// Predefined test scenarios
pub mod scenarios {
    use super::*;

    /// 8-bit counter: wraps constantly and overflows running time often
    pub fn narrow_counter(seed: u64) -> TimerSimulator<u8> {
        TimerSimulator::new(
            200,
            SimulationConfig {
                steps: 5_000,
                max_advance: 40,
                restart_probability: 0.02,
                seed,
            },
        )
    }

    /// 16-bit counter starting just before its wrap point
    pub fn wrapping_counter(seed: u64) -> TimerSimulator<u16> {
        TimerSimulator::new(
            u16::MAX - 500,
            SimulationConfig {
                steps: 10_000,
                max_advance: 2_000,
                restart_probability: 0.005,
                seed,
            },
        )
    }

    /// 32-bit microsecond counter with second-scale advances
    pub fn microsecond_counter(seed: u64) -> TimerSimulator<u32> {
        TimerSimulator::new(
            0,
            SimulationConfig {
                steps: 10_000,
                max_advance: 5_000_000,
                restart_probability: 0.001,
                seed,
            },
        )
    }

    /// 64-bit counter that never wraps in practice
    pub fn wide_counter(seed: u64) -> TimerSimulator<u64> {
        TimerSimulator::new(
            0,
            SimulationConfig {
                steps: 10_000,
                max_advance: 1_000_000,
                restart_probability: 0.001,
                seed,
            },
        )
    }
}
