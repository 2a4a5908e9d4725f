//! Session lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of a bridge session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No interpreter has been started yet.
    #[default]
    NotOpen,
    /// An interpreter is running and ready.
    Open,
    /// The interpreter was stopped by `close`.
    Closed,
}

/// State machine for tracking session lifecycle.
#[derive(Debug, Clone, Default)]
pub struct SessionStateMachine {
    state: SessionState,
    opens: usize,
    requests: usize,
}

impl SessionStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transition(&mut self, new_state: SessionState) {
        if self.state == new_state {
            return;
        }
        tracing::debug!(from = ?self.state, to = ?new_state, "State transition");
        if new_state == SessionState::Open {
            self.opens = self.opens.saturating_add(1);
        }
        self.state = new_state;
    }

    pub fn record_request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            opens: self.opens,
            requests: self.requests,
        }
    }
}

/// Session statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of interpreter processes started.
    pub opens: usize,
    /// Number of commands served.
    pub requests: usize,
}
