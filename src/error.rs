//! Domain errors raised by the streaming pipeline
//!
//! Each stage has its own error type so the orchestrator can decide what is
//! fatal to an exchange (transport) and what is skipped silently (parse).

use std::time::Duration;

use thiserror::Error;

/// Network or stream failure. Ends the current exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The outgoing call could not be made (connect, DNS, TLS, ...)
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    /// The orchestrator answered with a non-success status
    #[error("orchestrator responded with HTTP {status}")]
    Status { status: u16 },

    /// The response body aborted mid-stream
    #[error("stream read failed: {0}")]
    Read(String),

    /// No bytes arrived within the idle bound
    #[error("no data received for {}s", .0.as_secs())]
    IdleTimeout(Duration),
}

/// A frame that could not be turned into an event. Never surfaced to the user.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Frame does not start with the `data:` marker
    #[error("frame is missing the data marker: {preview:?}")]
    MissingMarker { preview: String },

    /// Payload is not JSON, or lacks `agent`/`content`
    #[error("malformed event payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Submission rejected before any state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("input is empty")]
    EmptyInput,

    #[error("an exchange is already in flight")]
    Busy,
}
