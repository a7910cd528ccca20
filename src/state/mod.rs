// Conversation and trace state
//
// The two sinks the session writes into, plus the lifecycle phase:
// - transcript: append-only list of finalized messages
// - trace: latest merged diagnostic record for the current exchange
// - phase: busy/idle lifecycle (see session::phase)
//
// The session is the single writer. Presentation code reads snapshots through
// `SharedState::lock` and subscribes to `SessionUpdate`s to know when to
// redraw.

use crate::observer::Observers;
use crate::parser::models::TraceRecord;
use crate::session::phase::{PhaseMachine, SessionPhase};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Who a transcript entry is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    Error,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Agent => "agent",
            Role::Error => "error",
        }
    }
}

/// One finalized transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Change notification for subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    MessageAppended(Message),
    TraceChanged(TraceRecord),
    PhaseChanged(SessionPhase),
}

/// Everything the presentation layer shows besides the typewriter log
#[derive(Debug, Default)]
pub struct ConversationState {
    transcript: Vec<Message>,
    trace: TraceRecord,
    phase: PhaseMachine,
    observers: Observers<SessionUpdate>,
}

impl ConversationState {
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn trace(&self) -> &TraceRecord {
        &self.trace
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.state()
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    /// Append to the transcript. Entries are never removed or reordered.
    pub fn append(&mut self, message: Message) {
        self.transcript.push(message.clone());
        self.observers
            .notify(&SessionUpdate::MessageAppended(message));
    }

    /// Forget the previous exchange's trace
    pub fn reset_trace(&mut self) {
        self.trace = TraceRecord::default();
        self.observers
            .notify(&SessionUpdate::TraceChanged(self.trace.clone()));
    }

    /// Merge an update into the trace, field by field
    pub fn merge_trace(&mut self, update: TraceRecord) {
        self.trace.merge(update);
        self.observers
            .notify(&SessionUpdate::TraceChanged(self.trace.clone()));
    }

    /// Apply a lifecycle transition, notifying subscribers if the phase moved
    pub fn transition<R>(&mut self, f: impl FnOnce(&mut PhaseMachine) -> R) -> R {
        let before = self.phase.state();
        let result = f(&mut self.phase);
        let after = self.phase.state();
        if before != after {
            self.observers.notify(&SessionUpdate::PhaseChanged(after));
        }
        result
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        self.observers.subscribe()
    }
}

/// Conversation state shared between the session and the presentation layer
#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<ConversationState>>);

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for a short, non-awaiting critical section
    pub fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        self.lock().subscribe()
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript().to_vec()
    }

    #[cfg(test)]
    pub fn trace(&self) -> TraceRecord {
        self.lock().trace().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_keeps_arrival_order() {
        let mut state = ConversationState::default();
        state.append(Message::new(Role::User, "status?"));
        state.append(Message::new(Role::Agent, "42"));

        let roles: Vec<Role> = state.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Agent]);
    }

    #[test]
    fn test_trace_merge_then_reset() {
        let mut state = ConversationState::default();
        state.merge_trace(TraceRecord {
            domain: Some("X".to_string()),
            ..Default::default()
        });
        state.merge_trace(TraceRecord {
            score: Some(0.8),
            ..Default::default()
        });
        assert_eq!(state.trace().domain.as_deref(), Some("X"));
        assert_eq!(state.trace().score, Some(0.8));

        state.reset_trace();
        assert!(state.trace().is_empty());
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let shared = SharedState::new();
        let mut updates = shared.subscribe();

        {
            let mut state = shared.lock();
            state.transition(|phase| phase.on_submit()).unwrap();
            state.append(Message::new(Role::User, "hello"));
        }

        assert_eq!(
            updates.try_recv().ok(),
            Some(SessionUpdate::PhaseChanged(SessionPhase::AwaitingResponse))
        );
        assert_eq!(
            updates.try_recv().ok(),
            Some(SessionUpdate::MessageAppended(Message::new(Role::User, "hello")))
        );
        assert!(shared.is_busy());
    }

    #[test]
    fn test_noop_transition_is_silent() {
        let shared = SharedState::new();
        let mut updates = shared.subscribe();
        shared.lock().transition(|phase| phase.on_stream_end());
        assert!(updates.try_recv().is_err());
    }
}
