//! Timer lifecycle states

use std::fmt;

use crate::TimerError;

/// Lifecycle state of an elapsed-time tracker.
///
/// Discriminants are ordered: every state at or above `Started` has been
/// started and is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum TimerState {
    /// Never started
    #[default]
    Stopped = 0,
    /// Running time is frozen
    Paused = 1,
    /// Running, never paused since the last start
    Started = 2,
    /// Running, paused at least once since the last start
    Resumed = 3,
}

impl TimerState {
    /// `Started` or `Resumed`
    #[inline]
    pub fn is_running(self) -> bool {
        self >= TimerState::Started
    }

    /// Anything but `Stopped`
    #[inline]
    pub fn has_started(self) -> bool {
        self != TimerState::Stopped
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerState::Stopped => "stopped",
            TimerState::Paused => "paused",
            TimerState::Started => "started",
            TimerState::Resumed => "resumed",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for TimerState {
    type Error = TimerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TimerState::Stopped),
            1 => Ok(TimerState::Paused),
            2 => Ok(TimerState::Started),
            3 => Ok(TimerState::Resumed),
            other => Err(TimerError::UnknownState(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering() {
        assert!(TimerState::Stopped < TimerState::Paused);
        assert!(TimerState::Paused < TimerState::Started);
        assert!(TimerState::Started < TimerState::Resumed);

        assert!(!TimerState::Stopped.is_running());
        assert!(!TimerState::Paused.is_running());
        assert!(TimerState::Started.is_running());
        assert!(TimerState::Resumed.is_running());

        assert!(TimerState::Paused.has_started());
        assert!(!TimerState::Stopped.has_started());
    }

    #[test]
    fn test_state_from_u8() {
        for state in [
            TimerState::Stopped,
            TimerState::Paused,
            TimerState::Started,
            TimerState::Resumed,
        ] {
            assert_eq!(TimerState::try_from(state as u8), Ok(state));
        }
        assert_eq!(TimerState::try_from(4), Err(TimerError::UnknownState(4)));
    }
}
