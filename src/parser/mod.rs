// Parser module - turns decoded frames into typed agent events
//
// Each frame produced by the stream decoder is expected to look like
//
//     data: {"agent": "...", "content": "...", "type": "...", "trace_data": {...}}
//
// Anything else is either a protocol anomaly (empty frame, `[DONE]` sentinel),
// which is silently ignored, or a parse error, which the caller logs and skips.
// Neither ever interrupts the stream.

pub mod models;

use crate::error::ParseError;
use models::{AgentEvent, EventKind, TraceRecord, WireEvent};
use serde_json::{Map, Value};

/// Marker every event frame starts with
pub const EVENT_MARKER: &str = "data:";

/// End-of-stream sentinel some servers send as a final data frame
const DONE_SENTINEL: &str = "[DONE]";

/// How much of a rejected frame to keep in the error for diagnostics
const PREVIEW_CHARS: usize = 40;

/// Parse one frame into zero or one event
///
/// Returns `Ok(None)` for frames that carry no event (empty or sentinel) and
/// `Err` for frames that should have carried one but could not be parsed.
pub fn parse_frame(frame: &str) -> Result<Option<AgentEvent>, ParseError> {
    let frame = frame.trim_start_matches('\n');
    if frame.trim().is_empty() {
        return Ok(None);
    }

    let Some(rest) = frame.strip_prefix(EVENT_MARKER) else {
        return Err(ParseError::MissingMarker {
            preview: frame.chars().take(PREVIEW_CHARS).collect(),
        });
    };
    let payload = rest.strip_prefix(' ').unwrap_or(rest).trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return Ok(None);
    }

    let wire: WireEvent = serde_json::from_str(payload).map_err(ParseError::InvalidPayload)?;

    Ok(Some(AgentEvent {
        kind: EventKind::from_wire(wire.kind.as_deref()),
        trace: wire.trace_data.and_then(validate_trace),
        agent_name: wire.agent,
        content: wire.content,
    }))
}

/// Convert wire trace data field by field
///
/// A field of the wrong type is dropped with a warning, as is a score outside
/// `[0, 1]`; the rest of the record survives. Null fields count as absent.
fn validate_trace(value: Value) -> Option<TraceRecord> {
    let Value::Object(fields) = value else {
        tracing::warn!("Ignoring trace_data that is not an object: {}", value);
        return None;
    };

    let score = match fields.get("score") {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_f64() {
            Some(score) if (0.0..=1.0).contains(&score) => Some(score),
            Some(score) => {
                tracing::warn!("Ignoring out-of-range confidence score {}", score);
                None
            }
            None => {
                tracing::warn!("Ignoring non-numeric confidence score {}", value);
                None
            }
        },
    };

    Some(TraceRecord {
        memory_context: string_field(&fields, "memory_context"),
        domain: string_field(&fields, "domain"),
        score,
        actual_value: fields.get("actual_value").filter(|v| !v.is_null()).cloned(),
    })
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => {
            tracing::warn!("Ignoring trace field {} with non-string value {}", key, other);
            None
        }
    }
}
