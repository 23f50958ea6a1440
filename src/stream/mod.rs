//! Decoding of streamed chat completions
//!
//! The response body is an event stream of `data: <json>` lines ending with
//! `data: [DONE]`:
//! - `decoder` - line splitting and per-line interpretation
//! - `sequence` - lazy `Stream` of events over a byte stream
//! - `sink` - forwarding fragments to the terminal while accumulating text

mod decoder;
mod events;
mod sequence;
mod sink;

pub use decoder::{parse_line, StreamDecoder};
pub use events::StreamEvent;
pub use sequence::{decode, ByteStream};
pub use sink::{forward_to_sink, OutputSink, StreamOutcome, WriterSink};
#[cfg(test)]
pub use sink::MockOutputSink;
