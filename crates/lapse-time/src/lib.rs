//! lapse Time - Elapsed-time tracking over wrapping tick counters
//!
//! This crate implements the tracker itself:
//! - `ElapsedTimer`: start, pause, resume and query running time
//! - Running time (pauses excluded) versus time since start (pauses included)
//! - Sticky accumulator-overflow detection, independent of counter wraparound
//! - `MonotonicClock`: a host tick source shaped like an embedded counter

pub mod clock;
pub mod timer;

pub use clock::*;
pub use timer::*;

pub use lapse_core::{Tick, TimeSource, TimerError, TimerResult, TimerState};
