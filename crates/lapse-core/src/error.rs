//! Error types for lapse timers

use thiserror::Error;

use crate::TimerState;

/// Why a timer operation produced no measurement
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    #[error("Timer not started")]
    NotStarted,

    #[error("Timer not running: state is {state}")]
    NotRunning { state: TimerState },

    #[error("Timer not paused: state is {state}")]
    NotPaused { state: TimerState },

    #[error("Running time overflowed its tick range ({count} overflows since start)")]
    Overflow { count: u16 },

    #[error("Unknown timer state: {0}")]
    UnknownState(u8),
}

/// Result type for timer operations
pub type TimerResult<T> = Result<T, TimerError>;
