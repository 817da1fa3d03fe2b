//! Retry state machine for one generation task.

use serde::Serialize;

/// Where a task stands in its retry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "attempt", rename_all = "snake_case")]
pub enum AttemptState {
    /// Running attempt `n`, 1-based
    Attempting(u32),
    Succeeded,
    Failed,
}

/// Result of one attempt as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptEvent {
    Succeeded,
    Failed { retryable: bool },
}

impl AttemptState {
    pub fn initial() -> Self {
        AttemptState::Attempting(1)
    }

    /// Next state after `event`. Terminal states absorb every event.
    pub fn advance(self, event: AttemptEvent, max_retries: u32) -> Self {
        match (self, event) {
            (AttemptState::Attempting(_), AttemptEvent::Succeeded) => AttemptState::Succeeded,
            (AttemptState::Attempting(n), AttemptEvent::Failed { retryable: true })
                if n < max_retries =>
            {
                AttemptState::Attempting(n + 1)
            }
            (AttemptState::Attempting(_), AttemptEvent::Failed { .. }) => AttemptState::Failed,
            (terminal, _) => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, AttemptState::Attempting(_))
    }
}
