// Stream module - byte stream to frame stream
//
// The orchestrator's response body arrives as a stream of byte chunks. This
// module wraps it in a lazy frame stream: frames are produced as soon as their
// delimiter arrives, the stream ends when the body ends, and a read failure is
// reported once and then the stream stops.

pub mod decoder;

use crate::error::TransportError;
use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::VecDeque;

pub use decoder::FrameDecoder;

/// Response body as delivered by a transport
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

struct FrameState<S> {
    bytes: S,
    decoder: FrameDecoder,
    ready: VecDeque<String>,
    done: bool,
}

/// Turn a byte stream into a finite, non-restartable stream of frames
pub fn frames<S>(bytes: S) -> impl Stream<Item = Result<String, TransportError>>
where
    S: Stream<Item = Result<Bytes, TransportError>> + Unpin,
{
    let state = FrameState {
        bytes,
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(frame) = state.ready.pop_front() {
                return Some((Ok(frame), state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.ready.extend(state.decoder.push(&chunk));
                    tracing::trace!(
                        "Received {} byte chunk ({} bytes buffered)",
                        chunk.len(),
                        state.decoder.buffered_len()
                    );
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    if let Some(tail) = std::mem::take(&mut state.decoder).finish() {
                        tracing::warn!(
                            "Stream ended mid-frame, dropping {} unterminated bytes",
                            tail.len()
                        );
                    }
                }
            }
        }
    })
}
