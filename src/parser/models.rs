// Data models for orchestrator event payloads
//
// `WireEvent` mirrors the JSON the orchestrator sends on the wire (snake_case
// keys, stringly-typed `type`). `trace_data` stays untyped there and is checked
// field by field, so one badly typed entry cannot sink the whole event. After
// the parse boundary nothing downstream touches untyped JSON, except
// `actual_value`, which the orchestrator leaves free-form.

use serde::{Deserialize, Serialize};

/// Event payload exactly as sent on the wire
#[derive(Debug, Deserialize)]
pub struct WireEvent {
    pub agent: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub trace_data: Option<serde_json::Value>,
}

/// Whether an event is intermediate progress or the exchange's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Partial,
    Final,
}

impl EventKind {
    /// Only `"final"` is terminal; `partial`, `trace`, `error` and a missing
    /// type are all intermediate.
    pub fn from_wire(kind: Option<&str>) -> Self {
        match kind {
            Some("final") => EventKind::Final,
            _ => EventKind::Partial,
        }
    }
}

/// Structured diagnostic snapshot shown in the trace side panel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceRecord {
    pub memory_context: Option<String>,
    pub domain: Option<String>,
    /// Confidence in `[0, 1]`
    pub score: Option<f64>,
    pub actual_value: Option<serde_json::Value>,
}

impl TraceRecord {
    /// Overwrite every field present in `update`; absent fields keep their value
    pub fn merge(&mut self, update: TraceRecord) {
        if update.memory_context.is_some() {
            self.memory_context = update.memory_context;
        }
        if update.domain.is_some() {
            self.domain = update.domain;
        }
        if update.score.is_some() {
            self.score = update.score;
        }
        if update.actual_value.is_some() {
            self.actual_value = update.actual_value;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.memory_context.is_none()
            && self.domain.is_none()
            && self.score.is_none()
            && self.actual_value.is_none()
    }
}

/// A validated event, ready to be routed by the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentEvent {
    pub agent_name: String,
    pub content: String,
    pub kind: EventKind,
    pub trace: Option<TraceRecord>,
}

impl AgentEvent {
    pub fn is_final(&self) -> bool {
        self.kind == EventKind::Final
    }

    /// Line appended to the typewriter log for this event
    pub fn log_line(&self) -> String {
        format!("\n[{}] {}", self.agent_name, self.content)
    }
}
