// Session orchestrator - drives one request/response exchange end to end
//
// submit("status?")
//   │
//   ├─ guard: reject blank input / exchange already in flight
//   ├─ transcript += user message, trace reset, log cleared + seeded, busy
//   │
//   ├─ transport.open() ──▶ bytes ──▶ frames ──▶ parse_frame ──▶ AgentEvent
//   │                                                   │
//   │        ┌──────────────────────────────────────────┤
//   │        ▼                   ▼                      ▼
//   │   merge trace        "\n[agent] content"    final? transcript += agent
//   │                       into typewriter
//   │
//   └─ stream end ──▶ Idle      transport error ──▶ Failed ──▶ error message ──▶ Idle
//
// Malformed frames are logged and skipped. The typewriter drain task is not
// owned here: it keeps revealing queued text after the exchange ends.

pub mod phase;
pub mod transport;

use crate::error::{SubmitError, TransportError};
use crate::parser::{self, models::AgentEvent};
use crate::state::{Message, Role, SharedState};
use crate::stream;
use crate::typewriter::TypewriterHandle;
use chrono::Local;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use transport::{with_idle_timeout, ChatRequest, ChatTransport};

/// First line of the kernel log for every exchange
pub const STATUS_LINE: &str = "> Initializing Orchestrator Link...";

/// Transcript entry recorded when an exchange fails
pub const LINK_FAILED: &str = "Kernel link failed.";

/// Per-session settings handed to the orchestrator at construction
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Streaming chat endpoint
    pub endpoint: String,
    pub user_id: String,
    pub session_id: String,
    /// Longest gap allowed between two response chunks
    pub idle_timeout: Duration,
}

/// What happened during one exchange
#[derive(Debug, Default)]
pub struct ExchangeSummary {
    /// Events parsed and routed
    pub events: usize,
    /// Of which final
    pub finals: usize,
    /// Frames dropped as malformed
    pub skipped: usize,
    /// Set when the exchange ended in a transport error
    pub failure: Option<TransportError>,
}

impl ExchangeSummary {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The session orchestrator. Cheap to clone; clones drive the same session.
#[derive(Clone)]
pub struct Session {
    config: Arc<SessionConfig>,
    transport: Arc<dyn ChatTransport>,
    state: SharedState,
    typewriter: TypewriterHandle,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn ChatTransport>,
        state: SharedState,
        typewriter: TypewriterHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            state,
            typewriter,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn typewriter(&self) -> &TypewriterHandle {
        &self.typewriter
    }

    /// Run one exchange to completion
    ///
    /// Transport failures are not returned as errors: they are reported in the
    /// transcript and in the summary, and the session is ready for the next
    /// submission afterwards.
    pub async fn submit(&self, input: &str) -> Result<ExchangeSummary, SubmitError> {
        let request = self.begin(input)?;
        tracing::info!(
            "Submitting query via {} transport to {}",
            self.transport.name(),
            self.config.endpoint
        );

        let mut summary = ExchangeSummary::default();
        match self.consume(&request, &mut summary).await {
            Ok(()) => self.finish(&summary),
            Err(e) => {
                self.fail(&e);
                summary.failure = Some(e);
            }
        }
        Ok(summary)
    }

    fn begin(&self, input: &str) -> Result<ChatRequest, SubmitError> {
        if input.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        {
            let mut state = self.state.lock();
            state.transition(|phase| phase.on_submit())?;
            state.append(Message::new(Role::User, input));
            state.reset_trace();
        }
        self.typewriter.clear();
        self.typewriter.append(STATUS_LINE);

        Ok(ChatRequest {
            query: input.to_string(),
            user_id: self.config.user_id.clone(),
            session_id: self.config.session_id.clone(),
        })
    }

    async fn consume(
        &self,
        request: &ChatRequest,
        summary: &mut ExchangeSummary,
    ) -> Result<(), TransportError> {
        let idle = self.config.idle_timeout;
        let body = tokio::time::timeout(idle, self.transport.open(&self.config.endpoint, request))
            .await
            .map_err(|_| TransportError::IdleTimeout(idle))??;

        let frames = stream::frames(with_idle_timeout(body, idle));
        futures::pin_mut!(frames);

        while let Some(frame) = frames.next().await {
            self.dispatch(&frame?, summary);
        }
        Ok(())
    }

    fn dispatch(&self, frame: &str, summary: &mut ExchangeSummary) {
        match parser::parse_frame(frame) {
            Ok(Some(event)) => self.route(event, summary),
            Ok(None) => tracing::trace!("Ignoring frame without event"),
            Err(e) => {
                summary.skipped += 1;
                tracing::warn!("Skipping malformed frame: {}", e);
            }
        }
    }

    fn route(&self, event: AgentEvent, summary: &mut ExchangeSummary) {
        summary.events += 1;
        tracing::debug!(
            agent = %event.agent_name,
            kind = ?event.kind,
            "Event received"
        );

        if let Some(trace) = event.trace.clone() {
            self.state.lock().merge_trace(trace);
        }
        self.typewriter.append(&event.log_line());
        if event.is_final() {
            summary.finals += 1;
            self.state
                .lock()
                .append(Message::new(Role::Agent, event.content));
        }
    }

    fn finish(&self, summary: &ExchangeSummary) {
        self.state.lock().transition(|phase| phase.on_stream_end());
        if summary.finals == 0 {
            tracing::info!("Stream ended without a final event");
        }
        tracing::info!(
            "Exchange complete: {} events ({} final), {} skipped",
            summary.events,
            summary.finals,
            summary.skipped
        );
    }

    fn fail(&self, error: &TransportError) {
        tracing::error!("Exchange failed: {}", error);
        {
            let mut state = self.state.lock();
            state.transition(|phase| phase.on_transport_error());
            state.append(Message::new(Role::Error, LINK_FAILED));
            state.transition(|phase| phase.on_failure_reported());
        }
        self.typewriter.append(&format!(
            "\n[{}] [ERROR] {}",
            Local::now().format("%H:%M:%S"),
            error
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::phase::SessionPhase;
    use crate::state::SessionUpdate;
    use crate::stream::ByteStream;
    use bytes::Bytes;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    /// Replays a fixed list of chunks (or fails to open)
    struct ScriptedTransport {
        chunks: Vec<Result<Bytes, TransportError>>,
        open_error: Option<TransportError>,
        never_ends: bool,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedTransport {
        fn chunks(parts: &[&str]) -> Self {
            Self {
                chunks: parts
                    .iter()
                    .map(|p| Ok(Bytes::from(p.to_string())))
                    .collect(),
                open_error: None,
                never_ends: false,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: TransportError) -> Self {
            Self {
                open_error: Some(error),
                ..Self::chunks(&[])
            }
        }
    }

    impl ChatTransport for ScriptedTransport {
        fn open<'a>(
            &'a self,
            _endpoint: &'a str,
            request: &'a ChatRequest,
        ) -> BoxFuture<'a, Result<ByteStream, TransportError>> {
            Box::pin(async move {
                self.requests.lock().unwrap().push(request.clone());
                if let Some(e) = &self.open_error {
                    return Err(e.clone());
                }
                let body = futures::stream::iter(self.chunks.clone());
                if self.never_ends {
                    Ok(body.chain(futures::stream::pending()).boxed())
                } else {
                    Ok(body.boxed())
                }
            })
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn session_with(transport: ScriptedTransport) -> (Session, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let config = SessionConfig {
            endpoint: "http://localhost:8001/chat_stream".to_string(),
            user_id: "default_user".to_string(),
            session_id: "session_1".to_string(),
            idle_timeout: Duration::from_secs(30),
        };
        let session = Session::new(
            config,
            transport.clone(),
            SharedState::new(),
            TypewriterHandle::new(),
        );
        (session, transport)
    }

    fn drain(typewriter: &TypewriterHandle) {
        while typewriter.tick().is_some() {}
    }

    #[tokio::test]
    async fn test_partial_then_final_exchange() {
        let (session, _) = session_with(ScriptedTransport::chunks(&[
            "data: {\"agent\":\"MemoryAgent\",\"content\":\"DATA_RETURN\",\"type\":\"partial\"}\n\n",
            "data: {\"agent\":\"FinanceOrchestrator\",\"content\":\"42\",\"type\":\"final\"}\n\n",
        ]));
        let mut updates = session.state().subscribe();

        let summary = session.submit("status?").await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.events, 2);
        assert_eq!(summary.finals, 1);
        assert_eq!(
            session.state().transcript(),
            vec![
                Message::new(Role::User, "status?"),
                Message::new(Role::Agent, "42"),
            ]
        );
        assert!(!session.state().is_busy());

        // Busy from submission until the stream ended
        let phases: Vec<SessionPhase> = std::iter::from_fn(|| updates.try_recv().ok())
            .filter_map(|u| match u {
                SessionUpdate::PhaseChanged(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![SessionPhase::AwaitingResponse, SessionPhase::Idle]
        );

        drain(session.typewriter());
        assert_eq!(
            session.typewriter().visible(),
            "> Initializing Orchestrator Link...\n[MemoryAgent] DATA_RETURN\n[FinanceOrchestrator] 42"
        );
    }

    #[tokio::test]
    async fn test_fragmented_stream_gives_same_result() {
        let full = "data: {\"agent\":\"A\",\"content\":\"x\",\"trace_data\":{\"domain\":\"Capex\"}}\n\ndata: {\"agent\":\"B\",\"content\":\"€42\",\"type\":\"final\"}\n\n";
        // Byte-level fragments, including mid code point
        let transport = ScriptedTransport {
            chunks: full
                .as_bytes()
                .chunks(3)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect(),
            ..ScriptedTransport::chunks(&[])
        };
        let (session, _) = session_with(transport);

        let summary = session.submit("q").await.unwrap();
        assert_eq!(summary.events, 2);
        assert_eq!(session.state().trace().domain.as_deref(), Some("Capex"));
        assert_eq!(
            session.state().transcript().last(),
            Some(&Message::new(Role::Agent, "€42"))
        );
    }

    #[tokio::test]
    async fn test_trace_fields_accumulate_across_events() {
        let (session, _) = session_with(ScriptedTransport::chunks(&[
            "data: {\"agent\":\"MemoryAgent\",\"content\":\"a\",\"trace_data\":{\"domain\":\"X\"}}\n\n",
            "data: {\"agent\":\"MatchingAgent\",\"content\":\"b\",\"trace_data\":{\"score\":0.8}}\n\n",
        ]));

        session.submit("q").await.unwrap();
        let trace = session.state().trace();
        assert_eq!(trace.domain.as_deref(), Some("X"));
        assert_eq!(trace.score, Some(0.8));
    }

    #[tokio::test]
    async fn test_trace_resets_on_new_exchange() {
        let (session, _) = session_with(ScriptedTransport::chunks(&[
            "data: {\"agent\":\"A\",\"content\":\"a\",\"trace_data\":{\"domain\":\"X\"}}\n\n",
        ]));
        session.submit("first").await.unwrap();
        assert!(!session.state().trace().is_empty());

        // Second exchange sees the same stream; trace was cleared in between
        let mut updates = session.state().subscribe();
        session.submit("second").await.unwrap();
        let first_trace = std::iter::from_fn(|| updates.try_recv().ok()).find_map(|u| match u {
            SessionUpdate::TraceChanged(t) => Some(t),
            _ => None,
        });
        assert_eq!(first_trace.map(|t| t.is_empty()), Some(true));
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped() {
        let (session, _) = session_with(ScriptedTransport::chunks(&[
            "data: not-json\n\n",
            "data: {\"agent\":\"A\",\"content\":\"ok\",\"type\":\"final\"}\n\n",
        ]));

        let summary = session.submit("q").await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.events, 1);
        assert_eq!(session.state().transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_unterminated_final_frame_is_dropped() {
        let (session, _) = session_with(ScriptedTransport::chunks(&[
            "data: {\"agent\":\"A\",\"content\":\"x\",\"type\":\"final\"}",
        ]));

        let summary = session.submit("q").await.unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.events, 0);
        assert_eq!(
            session.state().transcript(),
            vec![Message::new(Role::User, "q")]
        );
        assert!(!session.state().is_busy());
    }

    #[tokio::test]
    async fn test_transport_failure_after_zero_events() {
        let (session, _) = session_with(ScriptedTransport::failing(TransportError::Request {
            endpoint: "http://localhost:8001/chat_stream".to_string(),
            message: "connection refused".to_string(),
        }));

        let summary = session.submit("status?").await.unwrap();
        assert!(!summary.is_success());

        let transcript = session.state().transcript();
        let errors: Vec<_> = transcript.iter().filter(|m| m.role == Role::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].content, LINK_FAILED);
        assert!(!session.state().is_busy());
        assert_eq!(session.state().lock().phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_read_error_keeps_earlier_events() {
        let mut transport = ScriptedTransport::chunks(&[
            "data: {\"agent\":\"A\",\"content\":\"first\",\"type\":\"final\"}\n\n",
        ]);
        transport
            .chunks
            .push(Err(TransportError::Read("connection reset".to_string())));
        let (session, _) = session_with(transport);

        let summary = session.submit("q").await.unwrap();
        assert_eq!(
            summary.failure,
            Some(TransportError::Read("connection reset".to_string()))
        );
        let roles: Vec<Role> = session
            .state()
            .transcript()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, vec![Role::User, Role::Agent, Role::Error]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_stream_times_out() {
        let mut transport = ScriptedTransport::chunks(&[
            "data: {\"agent\":\"A\",\"content\":\"working\"}\n\n",
        ]);
        transport.never_ends = true;
        let (session, _) = session_with(transport);

        let summary = session.submit("q").await.unwrap();
        assert_eq!(summary.events, 1);
        assert_eq!(
            summary.failure,
            Some(TransportError::IdleTimeout(Duration::from_secs(30)))
        );
        assert!(!session.state().is_busy());
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_side_effects() {
        let (session, transport) = session_with(ScriptedTransport::chunks(&[]));

        assert_eq!(session.submit("   ").await.unwrap_err(), SubmitError::EmptyInput);
        assert!(session.state().transcript().is_empty());
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_while_in_flight_is_rejected() {
        let (session, _) = session_with(ScriptedTransport::chunks(&[]));

        session.begin("first").unwrap();
        assert!(session.state().is_busy());

        assert_eq!(session.submit("second").await.unwrap_err(), SubmitError::Busy);
        assert_eq!(
            session.state().transcript(),
            vec![Message::new(Role::User, "first")]
        );
    }

    #[tokio::test]
    async fn test_request_carries_configured_identity() {
        let (session, transport) = session_with(ScriptedTransport::chunks(&[]));
        session.submit("status?").await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            &[ChatRequest {
                query: "status?".to_string(),
                user_id: "default_user".to_string(),
                session_id: "session_1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_failure_is_logged_to_typewriter() {
        let (session, _) = session_with(ScriptedTransport::failing(TransportError::Status {
            status: 502,
        }));
        session.submit("q").await.unwrap();

        drain(session.typewriter());
        let visible = session.typewriter().visible();
        assert!(visible.starts_with(STATUS_LINE));
        assert!(visible.contains("[ERROR] orchestrator responded with HTTP 502"));
    }
}
