// Exchange lifecycle state machine
//
// Makes the session's busy/idle transitions explicit and unit-testable.
//
// State Diagram:
//
//   [Idle] ──submit──▶ [AwaitingResponse] ──stream end──▶ [Idle]
//     ▲                        │
//     │                        │ transport error
//     │                        ▼
//     └──failure reported── [Failed]
//
// Submitting while AwaitingResponse is rejected. Submitting from Failed is
// allowed: Failed is only observable between the error and its report.

use crate::error::SubmitError;

/// Where the session is in its request/response exchange
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Request sent, response stream being consumed
    AwaitingResponse,
    /// Transport failed, error not yet reported to the transcript
    Failed,
}

impl SessionPhase {
    pub fn is_busy(self) -> bool {
        self == SessionPhase::AwaitingResponse
    }
}

/// Encapsulates all transition rules for the exchange lifecycle
#[derive(Debug, Default)]
pub struct PhaseMachine {
    state: SessionPhase,
}

impl PhaseMachine {
    /// Get current state
    pub fn state(&self) -> SessionPhase {
        self.state
    }

    /// User submitted input
    pub fn on_submit(&mut self) -> Result<(), SubmitError> {
        if self.state.is_busy() {
            return Err(SubmitError::Busy);
        }
        self.state = SessionPhase::AwaitingResponse;
        Ok(())
    }

    /// Response stream ended normally
    pub fn on_stream_end(&mut self) {
        if self.state == SessionPhase::AwaitingResponse {
            self.state = SessionPhase::Idle;
        }
    }

    /// Outgoing call or stream read failed
    pub fn on_transport_error(&mut self) {
        if self.state == SessionPhase::AwaitingResponse {
            self.state = SessionPhase::Failed;
        }
    }

    /// Error message has been appended; ready for the next exchange
    pub fn on_failure_reported(&mut self) {
        if self.state == SessionPhase::Failed {
            self.state = SessionPhase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let sm = PhaseMachine::default();
        assert_eq!(sm.state(), SessionPhase::Idle);
        assert!(!sm.state().is_busy());
    }

    #[test]
    fn test_success_flow() {
        let mut sm = PhaseMachine::default();
        sm.on_submit().unwrap();
        assert_eq!(sm.state(), SessionPhase::AwaitingResponse);
        assert!(sm.state().is_busy());

        sm.on_stream_end();
        assert_eq!(sm.state(), SessionPhase::Idle);
    }

    #[test]
    fn test_failure_flow() {
        let mut sm = PhaseMachine::default();
        sm.on_submit().unwrap();
        sm.on_transport_error();
        assert_eq!(sm.state(), SessionPhase::Failed);
        assert!(!sm.state().is_busy());

        sm.on_failure_reported();
        assert_eq!(sm.state(), SessionPhase::Idle);
    }

    #[test]
    fn test_submit_while_awaiting_is_rejected() {
        let mut sm = PhaseMachine::default();
        sm.on_submit().unwrap();
        assert_eq!(sm.on_submit(), Err(SubmitError::Busy));
        assert_eq!(sm.state(), SessionPhase::AwaitingResponse);
    }

    #[test]
    fn test_stray_events_do_not_change_idle() {
        let mut sm = PhaseMachine::default();
        sm.on_stream_end();
        sm.on_transport_error();
        sm.on_failure_reported();
        assert_eq!(sm.state(), SessionPhase::Idle);
    }
}
