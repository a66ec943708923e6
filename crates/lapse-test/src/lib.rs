//! lapse Test Harness - Controllable clocks and timer validation
//!
//! This crate provides:
//! - Manually driven and self-stepping tick sources
//! - Randomized timer simulation checked against an unbounded reference model
//! - End-to-end integration scenarios across counter widths

pub mod clock;
pub mod time_simulator;
pub mod integration;

pub use clock::*;
pub use time_simulator::*;
pub use integration::*;
