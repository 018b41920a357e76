//! Incremental Server-Sent-Events parser for streamed completions
//!
//! Bytes arrive in arbitrary network-sized pieces. The parser buffers them,
//! cuts complete lines and groups `data:` lines into events:
//! - Buffer: 1MB maximum for a single unfinished line
//! - Events end at a blank line
//! - `data: [DONE]` marks the end of the stream

use crate::errors::{F2ReadError, Result};
use crate::streaming::types::ChatChunk;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::VecDeque;

/// Maximum buffer size (1MB)
pub const MAX_BUFFER_SIZE: usize = 1_048_576;

/// Sentinel payload closing an OpenAI-style stream
pub const DONE_MARKER: &str = "[DONE]";

/// A complete event extracted from the byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of one event, multi-line data joined with `\n`
    Data(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Incremental SSE parser
#[derive(Debug)]
pub struct SseParser {
    /// Bytes of the line currently being received
    buffer: Vec<u8>,

    /// `data:` lines of the event currently being assembled
    data_lines: Vec<String>,

    /// Maximum buffer size
    max_buffer_size: usize,
}

impl SseParser {
    /// Create new parser with default settings
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_SIZE)
    }

    /// Create parser with custom buffer capacity
    pub fn with_capacity(max_buffer_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            data_lines: Vec::new(),
            max_buffer_size,
        }
    }

    /// Add bytes and return every event they complete.
    ///
    /// Only the unfinished line left over after cutting complete lines counts
    /// against the buffer limit.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>> {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = decode_line(&buffer[start..end])?;
            start = end + 1;
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        buffer.drain(..start);
        if buffer.len() > self.max_buffer_size {
            return Err(F2ReadError::StreamingError(format!(
                "Buffer overflow: {} bytes exceeds maximum {}",
                buffer.len(),
                self.max_buffer_size
            )));
        }

        self.buffer = buffer;
        Ok(events)
    }

    /// Flush a trailing line and event when the body ends without a blank line
    pub fn finish(&mut self) -> Result<Option<SseEvent>> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            let line = decode_line(&line)?;
            if let Some(event) = self.process_line(&line) {
                return Ok(Some(event));
            }
        }

        Ok(self.dispatch())
    }

    /// Get current buffer size
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.data_lines.is_empty()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.dispatch();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        // event, id and retry fields carry nothing f2read needs
        if field == "data" {
            self.data_lines.push(value.to_string());
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            return None;
        }

        let data = self.data_lines.join("\n");
        self.data_lines.clear();

        if data.trim() == DONE_MARKER {
            Some(SseEvent::Done)
        } else {
            Some(SseEvent::Data(data))
        }
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_line(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| F2ReadError::StreamingError(format!("Invalid UTF-8 in stream: {}", e)))
}

/// Parse an event payload into a chunk, surfacing embedded API errors
pub fn parse_chunk(data: &str) -> Result<ChatChunk> {
    let chunk: ChatChunk = serde_json::from_str(data)?;

    if let Some(error) = &chunk.error {
        return Err(F2ReadError::ApiError(error.message.clone()));
    }

    Ok(chunk)
}

struct DecodeState<S> {
    bytes: S,
    parser: SseParser,
    pending: VecDeque<ChatChunk>,
    finished: bool,
}

/// Turn a raw SSE body into a stream of chat chunks.
///
/// The stream ends at `[DONE]` or when the body ends. The first error is
/// yielded and ends the stream.
pub fn decode_event_stream<S>(bytes: S) -> BoxStream<'static, Result<ChatChunk>>
where
    S: Stream<Item = Result<Vec<u8>>> + Send + Unpin + 'static,
{
    let state = DecodeState {
        bytes,
        parser: SseParser::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(chunk) = state.pending.pop_front() {
                return Some((Ok(chunk), state));
            }

            if state.finished {
                return None;
            }

            let events = match state.bytes.next().await {
                Some(Ok(bytes)) => state.parser.push(&bytes),
                Some(Err(e)) => Err(e),
                None => {
                    state.finished = true;
                    state.parser.finish().map(|event| event.into_iter().collect())
                }
            };

            let events = match events {
                Ok(events) => events,
                Err(e) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
            };

            for event in events {
                match event {
                    SseEvent::Done => {
                        state.finished = true;
                        break;
                    }
                    SseEvent::Data(data) => match parse_chunk(&data) {
                        Ok(chunk) => state.pending.push_back(chunk),
                        Err(e) => {
                            state.finished = true;
                            state.pending.clear();
                            return Some((Err(e), state));
                        }
                    },
                }
            }
        }
    })
    .boxed()
}
