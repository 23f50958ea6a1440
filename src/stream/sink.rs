use futures::{pin_mut, Stream, StreamExt};
use std::io::{self, Write};

use super::events::StreamEvent;
use crate::utils::{log_debug, log_warn, ListgenError, Result};

/// Destination for generated text as it streams in
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send {
    /// Write one fragment; it must be visible before this returns
    fn write_fragment(&mut self, fragment: &str) -> io::Result<()>;
}

/// Sink over any writer, flushing after every fragment
pub struct WriterSink<W: Write + Send> {
    writer: W,
    at_line_start: bool,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            at_line_start: true,
        }
    }

    /// True when nothing was written or the output ends with a newline
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// Sink for the terminal
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> OutputSink for WriterSink<W> {
    fn write_fragment(&mut self, fragment: &str) -> io::Result<()> {
        self.writer.write_all(fragment.as_bytes())?;
        if let Some(last) = fragment.chars().last() {
            self.at_line_start = last == '\n';
        }
        self.writer.flush()
    }
}

/// Summary of a fully consumed event sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOutcome {
    /// Concatenation of every fragment, in arrival order
    pub text: String,
    /// Whether the `[DONE]` sentinel was seen
    pub completed: bool,
    pub fragments: usize,
    pub malformed: usize,
}

/// Drive an event sequence to its end, forwarding fragments to `sink`
///
/// Each fragment is written before the next event is pulled. Malformed
/// records are counted and otherwise ignored. A body that closes without
/// `[DONE]` still succeeds with whatever text arrived.
pub async fn forward_to_sink<S>(events: S, sink: &mut dyn OutputSink) -> Result<StreamOutcome>
where
    S: Stream<Item = Result<StreamEvent>>,
{
    pin_mut!(events);
    let mut outcome = StreamOutcome::default();

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::ContentFragment(text) => {
                sink.write_fragment(&text).map_err(|e| {
                    ListgenError::unknown(format!("Failed to write output: {}", e))
                })?;
                outcome.text.push_str(&text);
                outcome.fragments += 1;
            }
            StreamEvent::Malformed(raw) => {
                log_debug(format!("Skipping malformed stream record: {}", raw));
                outcome.malformed += 1;
            }
            StreamEvent::Done => {
                outcome.completed = true;
                break;
            }
        }
    }

    if !outcome.completed {
        if outcome.text.is_empty() {
            log_warn("[stream]", "Response ended before [DONE] without any content");
        } else {
            log_debug("Response ended before [DONE]; keeping the text received so far");
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::decode;
    use bytes::Bytes;
    use futures::channel::mpsc;
    use futures::stream;
    use std::sync::{Arc, Mutex};
    use mockall::{predicate::eq, Sequence};
    use pretty_assertions::assert_eq;

    fn fragment(text: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::ContentFragment(text.to_string()))
    }

    #[tokio::test]
    async fn test_accumulates_and_writes_in_order() {
        let events = stream::iter(vec![
            fragment("Hi"),
            Ok(StreamEvent::Malformed("{not valid json".to_string())),
            fragment(" there"),
            Ok(StreamEvent::Done),
        ]);
        let mut sink = WriterSink::new(Vec::new());

        let outcome = forward_to_sink(events, &mut sink).await.unwrap();
        assert_eq!(
            outcome,
            StreamOutcome {
                text: "Hi there".to_string(),
                completed: true,
                fragments: 2,
                malformed: 1,
            }
        );
        assert_eq!(sink.into_inner(), b"Hi there".to_vec());
    }

    #[tokio::test]
    async fn test_each_fragment_reaches_sink_in_sequence() {
        let mut seq = Sequence::new();
        let mut sink = MockOutputSink::new();
        for text in ["1. Red\n", "2. Green\n", "3. Blue\n"] {
            sink.expect_write_fragment()
                .with(eq(text))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        let events = stream::iter(vec![
            fragment("1. Red\n"),
            fragment("2. Green\n"),
            fragment("3. Blue\n"),
            Ok(StreamEvent::Done),
        ]);
        let outcome = forward_to_sink(events, &mut sink).await.unwrap();
        assert_eq!(outcome.text, "1. Red\n2. Green\n3. Blue\n");
    }

    #[tokio::test]
    async fn test_close_without_done_is_lenient() {
        let mut sink = WriterSink::new(Vec::new());
        let outcome = forward_to_sink(stream::iter(vec![fragment("partial")]), &mut sink)
            .await
            .unwrap();
        assert_eq!(outcome.text, "partial");
        assert!(!outcome.completed);

        let empty = forward_to_sink(stream::iter(Vec::<Result<StreamEvent>>::new()), &mut sink)
            .await
            .unwrap();
        assert_eq!(empty, StreamOutcome::default());
    }

    /// Sink whose contents stay observable while it is borrowed
    struct SharedSink(Arc<Mutex<String>>);

    impl OutputSink for SharedSink {
        fn write_fragment(&mut self, fragment: &str) -> io::Result<()> {
            self.0.lock().unwrap().push_str(fragment);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fragment_written_before_next_chunk_arrives() {
        let (tx, rx) = mpsc::unbounded::<Bytes>();
        let written = Arc::new(Mutex::new(String::new()));
        let mut sink = SharedSink(Arc::clone(&written));

        let consumer = forward_to_sink(decode(rx.map(Ok)), &mut sink);
        let producer = async {
            tx.unbounded_send(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            ))
            .unwrap();
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            assert_eq!(*written.lock().unwrap(), "Hi");

            tx.unbounded_send(Bytes::from_static(b"data: [DONE]\n\n"))
                .unwrap();
        };

        let (outcome, ()) = tokio::join!(consumer, producer);
        let outcome = outcome.unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.text, "Hi");
    }

    #[test]
    fn test_writer_sink_tracks_line_start() {
        let mut sink = WriterSink::new(Vec::new());
        assert!(sink.at_line_start());

        sink.write_fragment("1. Red").unwrap();
        assert!(!sink.at_line_start());

        sink.write_fragment("").unwrap();
        assert!(!sink.at_line_start());

        sink.write_fragment("\n").unwrap();
        assert!(sink.at_line_start());
    }

    #[tokio::test]
    async fn test_sink_failure_is_reported() {
        let mut sink = MockOutputSink::new();
        sink.expect_write_fragment()
            .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")));

        let err = forward_to_sink(stream::iter(vec![fragment("x")]), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ListgenError::UnknownError(_)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut sink = WriterSink::new(Vec::new());
        let events = stream::iter(vec![
            fragment("a"),
            Err(ListgenError::network("reset by peer")),
        ]);
        let err = forward_to_sink(events, &mut sink).await.unwrap_err();
        assert!(matches!(err, ListgenError::NetworkError(_)));
        assert_eq!(sink.into_inner(), b"a".to_vec());
    }
}
