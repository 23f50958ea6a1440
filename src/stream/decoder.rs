use std::borrow::Cow;

use super::events::{StreamChunk, StreamEvent};
use crate::constants::{SSE_DATA_PREFIX, SSE_DONE_SENTINEL};

/// Interpret a single line of the event stream
///
/// Returns `None` for lines that carry nothing: keep-alives, comments,
/// non-data framing and chunks without text.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(SSE_DATA_PREFIX)?;

    if payload.trim() == SSE_DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => chunk
            .into_content()
            .filter(|content| !content.is_empty())
            .map(StreamEvent::ContentFragment),
        Err(_) => Some(StreamEvent::Malformed(payload.to_string())),
    }
}

/// Incremental line splitter for event-stream bytes
///
/// Bytes are held back until their line is complete, so a JSON record or a
/// multi-byte character split across two network chunks is decoded intact.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk, returning the events of every line it completes
    ///
    /// Once `Done` is produced the rest of the chunk and all later chunks are
    /// discarded.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(pos) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            let event = parse_line(&decode_line(&self.buffer[start..end]));
            start = end + 1;

            if let Some(event) = event {
                let is_done = event == StreamEvent::Done;
                events.push(event);
                if is_done {
                    self.done = true;
                    break;
                }
            }
        }

        if self.done {
            self.buffer.clear();
        } else {
            self.buffer.drain(..start);
        }
        events
    }

    /// Flush a trailing line that never got its newline
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.done || self.buffer.is_empty() {
            self.buffer.clear();
            return Vec::new();
        }

        let rest = std::mem::take(&mut self.buffer);
        let event = parse_line(&decode_line(&rest));
        if event == Some(StreamEvent::Done) {
            self.done = true;
        }
        event.into_iter().collect()
    }
}

fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes)
}
