/// Task state definitions for tracking crawl progress
use std::fmt;

/// Represents the current state of a task in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Waiting in the retry queue for a free worker
    Queued,

    /// Handed to a worker and not yet completed
    InFlight,

    // ===== Terminal States =====
    /// The last attempt succeeded
    RetiredSuccess,

    /// Every allowed attempt failed
    RetiredFailed,
}

impl TaskState {
    /// Returns true if no further processing will happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RetiredSuccess | Self::RetiredFailed)
    }

    /// Returns true if the task is still being scheduled
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::InFlight)
    }

    /// Returns true if this transition is part of the task lifecycle
    ///
    /// ```text
    /// Queued -> InFlight -> RetiredSuccess
    ///              |    \-> RetiredFailed
    ///              \-> Queued (retry)
    /// ```
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::InFlight)
                | (Self::InFlight, Self::Queued)
                | (Self::InFlight, Self::RetiredSuccess)
                | (Self::InFlight, Self::RetiredFailed)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InFlight => "in_flight",
            Self::RetiredSuccess => "retired_success",
            Self::RetiredFailed => "retired_failed",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> [Self; 4] {
        [
            Self::Queued,
            Self::InFlight,
            Self::RetiredSuccess,
            Self::RetiredFailed,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
