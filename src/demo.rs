// Demo mode: replay a realistic orchestrator stream without a backend
//
// `DemoTransport` implements `ChatTransport`, so the whole pipeline (decoder,
// parser, session, typewriter, TUI) runs exactly as it would against the real
// endpoint. The scripted body is cut into deliberately awkward chunk sizes
// that split frames and multi-byte characters, and chunks are released with a
// delay so the trace panel fills in step by step.
//
// Queries containing "fail" end the stream with a read error after the first
// agents have reported, which exercises the failure path.
//
// Run with: AUDIT_CONSOLE_DEMO=1 cargo run --release  (or --demo)

use crate::error::TransportError;
use crate::session::transport::{ChatRequest, ChatTransport};
use crate::stream::ByteStream;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

/// Delay between two chunks of the demo body
const CHUNK_DELAY: Duration = Duration::from_millis(80);

/// Chunk sizes cycled over the body. Primes, so boundaries drift across frames.
const CHUNK_SIZES: [usize; 5] = [7, 31, 17, 53, 3];

/// Canned orchestrator that streams a fixed multi-agent exchange
pub struct DemoTransport {
    chunk_delay: Duration,
}

impl DemoTransport {
    pub fn new() -> Self {
        Self {
            chunk_delay: CHUNK_DELAY,
        }
    }

    #[cfg(test)]
    pub fn with_chunk_delay(chunk_delay: Duration) -> Self {
        Self { chunk_delay }
    }
}

impl Default for DemoTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTransport for DemoTransport {
    fn open<'a>(
        &'a self,
        endpoint: &'a str,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<ByteStream, TransportError>> {
        Box::pin(async move {
            tracing::debug!(
                "Demo transport replaying script for {} (session {})",
                endpoint,
                request.session_id
            );

            let fail = request.query.to_lowercase().contains("fail");
            let body = demo_body(&request.query, fail);
            let delay = self.chunk_delay;

            let chunks = chunk_bytes(body.as_bytes(), &CHUNK_SIZES)
                .into_iter()
                .map(Ok::<_, TransportError>);
            let failure = fail.then(|| {
                Err(TransportError::Read(
                    "connection reset by orchestrator".to_string(),
                ))
            });

            let body = stream::iter(chunks.chain(failure)).then(move |chunk| async move {
                sleep(delay).await;
                chunk
            });
            Ok(body.boxed())
        })
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}

/// One SSE frame carrying `payload`
fn frame(payload: Value) -> String {
    format!("data: {}\n\n", payload)
}

/// The scripted exchange for `query`. When `fail` is set the script stops
/// after the classification step.
fn demo_body(query: &str, fail: bool) -> String {
    let mut frames = vec![
        frame(json!({
            "agent": "MemoryAgent",
            "content": "Searching world model for comparable cases…",
            "type": "partial",
            "trace_data": {
                "memory_context": "3 prior cases · Q3 vendor invoice variance (Zürich office)"
            }
        })),
        frame(json!({
            "agent": "MatchingAgent",
            "content": "Intent classified → accounts payable reconciliation",
            "type": "partial",
            "trace_data": { "domain": "Accounts Payable" }
        })),
    ];

    if fail {
        return frames.concat();
    }

    frames.extend([
        // Malformed on purpose: the console logs and skips it
        "data: {\"agent\": \"ConversationAgent\", \"content\": \n\n".to_string(),
        frame(json!({
            "agent": "ConversationAgent",
            "content": format!("Drafting answer for “{}”", query),
            "type": "partial",
            "trace_data": { "score": 0.87 }
        })),
        frame(json!({
            "agent": "FinanceOrchestrator",
            "content": "Audit complete: invoice INV-2041 exceeds its purchase order by €1,240.00 and has been flagged for review.",
            "type": "final",
            "trace_data": { "actual_value": 1240.0 }
        })),
        "data: [DONE]\n\n".to_string(),
    ]);

    frames.concat()
}

/// Cut `body` into chunks, cycling through `sizes`. Boundaries ignore UTF-8.
fn chunk_bytes(body: &[u8], sizes: &[usize]) -> Vec<Bytes> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    for &size in sizes.iter().cycle() {
        if offset >= body.len() {
            break;
        }
        let end = (offset + size.max(1)).min(body.len());
        chunks.push(Bytes::copy_from_slice(&body[offset..end]));
        offset = end;
    }
    chunks
}
