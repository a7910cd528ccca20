// Incremental frame decoder
//
// Turns arbitrarily-fragmented response bytes into complete event frames.
// Two pieces of state are carried between reads:
//
// 1. `utf8_tail`: the leading bytes of a code point whose remaining bytes have
//    not arrived yet. They are held back rather than decoded lossily.
// 2. `buffer`: decoded text that has not been terminated by a blank line yet.
//
// A frame is only emitted once its trailing delimiter is observed, which makes
// the output independent of where the network split the input.

/// Frames are separated by a blank line
pub const FRAME_DELIMITER: &str = "\n\n";

/// Streaming decoder state for one response body
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8_tail: Vec<u8>,
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of bytes, returning every frame completed by it
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        // A delimiter can straddle the previous chunk's last char and this chunk
        let mut search_from = self
            .buffer
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        self.decode_into_buffer(bytes);

        let mut frames = Vec::new();
        while let Some(offset) = self.buffer[search_from..].find(FRAME_DELIMITER) {
            let end = search_from + offset;
            frames.push(self.buffer[..end].to_string());
            self.buffer.drain(..end + FRAME_DELIMITER.len());
            search_from = 0;
        }
        frames
    }

    /// End of data. Returns the unterminated leftover, which is never a frame.
    pub fn finish(self) -> Option<String> {
        let mut leftover = self.buffer;
        if !self.utf8_tail.is_empty() {
            leftover.push_str(&String::from_utf8_lossy(&self.utf8_tail));
        }
        (!leftover.is_empty()).then_some(leftover)
    }

    /// Bytes buffered but not yet emitted as part of a frame
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.utf8_tail.len()
    }

    fn decode_into_buffer(&mut self, bytes: &[u8]) {
        self.utf8_tail.extend_from_slice(bytes);
        let pending = std::mem::take(&mut self.utf8_tail);

        let mut rest = pending.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.push_text(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.push_text(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        // Invalid sequence: substitute and keep going
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Truncated code point: wait for the next read
                        None => {
                            self.utf8_tail = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        // CRLF framing decodes the same as LF framing
        self.buffer.extend(text.chars().filter(|&c| c != '\r'));
    }
}
