//! Outbound call to the orchestrator
//!
//! `ChatTransport` is the seam between the session and the network: the HTTP
//! implementation posts the query and hands back the streaming response body,
//! the demo implementation replays a canned stream, and tests script their
//! own byte chunks.

use crate::error::TransportError;
use crate::stream::ByteStream;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::Duration;

/// Request body expected by the orchestrator's streaming endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    pub user_id: String,
    pub session_id: String,
}

/// Opens one streaming exchange
pub trait ChatTransport: Send + Sync {
    /// Send `request` to `endpoint` and return the response body as it arrives
    fn open<'a>(
        &'a self,
        endpoint: &'a str,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<ByteStream, TransportError>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Check if a response is SSE based on content-type header
pub fn is_event_stream(headers: &reqwest::header::HeaderMap) -> bool {
    headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/event-stream"))
        .unwrap_or(false)
}

/// HTTP transport over a pooled reqwest client
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Request {
                endpoint: String::new(),
                message: format!("could not build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl ChatTransport for HttpTransport {
    fn open<'a>(
        &'a self,
        endpoint: &'a str,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<ByteStream, TransportError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(endpoint)
                .header(reqwest::header::ACCEPT, "text/event-stream")
                .json(request)
                .send()
                .await
                .map_err(|e| TransportError::Request {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                });
            }
            if !is_event_stream(response.headers()) {
                tracing::debug!("Response from {} is not text/event-stream", endpoint);
            }

            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| TransportError::Read(e.to_string())));
            Ok(body.boxed())
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Fail the stream if no chunk arrives within `idle`
pub fn with_idle_timeout(body: ByteStream, idle: Duration) -> ByteStream {
    stream::unfold(Some(body), move |body| async move {
        let mut body = body?;
        match tokio::time::timeout(idle, body.next()).await {
            Ok(Some(chunk)) => Some((chunk, Some(body))),
            Ok(None) => None,
            Err(_) => Some((Err(TransportError::IdleTimeout(idle)), None)),
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

    #[test]
    fn test_is_event_stream() {
        let mut headers = HeaderMap::new();
        assert!(!is_event_stream(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/event-stream; charset=utf-8"),
        );
        assert!(is_event_stream(&headers));
    }

    #[test]
    fn test_request_body_uses_snake_case() {
        let request = ChatRequest {
            query: "status?".to_string(),
            user_id: "default_user".to_string(),
            session_id: "session_1".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "status?",
                "user_id": "default_user",
                "session_id": "session_1"
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_ends_silent_stream() {
        let silent = stream::pending::<Result<Bytes, TransportError>>().boxed();
        let idle = Duration::from_secs(30);
        let collected: Vec<_> = with_idle_timeout(silent, idle).collect().await;

        assert_eq!(collected, vec![Err(TransportError::IdleTimeout(idle))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_passes_chunks_through() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"data: a\n\n")),
            Ok(Bytes::from_static(b"data: b\n\n")),
        ])
        .boxed();
        let collected: Vec<_> = with_idle_timeout(body, Duration::from_secs(1))
            .collect()
            .await;

        assert_eq!(collected.len(), 2);
        assert!(collected.iter().all(|c| c.is_ok()));
    }
}
