use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

use super::decoder::StreamDecoder;
use super::events::StreamEvent;
use crate::utils::Result;

/// Response body as it arrives from the transport
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

struct DecodeState<S> {
    body: S,
    decoder: StreamDecoder,
    pending: VecDeque<StreamEvent>,
    closed: bool,
}

/// Turn a byte stream into a lazy sequence of stream events
///
/// A chunk is only pulled from `body` once every event of the previous chunk
/// has been consumed. The sequence ends after `Done`, after the body closes,
/// or after the first transport error, which is yielded as the last item.
pub fn decode<S>(body: S) -> impl Stream<Item = Result<StreamEvent>>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    let state = DecodeState {
        body,
        decoder: StreamDecoder::new(),
        pending: VecDeque::new(),
        closed: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((Ok(event), state));
            }
            if state.closed || state.decoder.is_done() {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.pending.extend(state.decoder.feed(&chunk)),
                Some(Err(e)) => {
                    state.closed = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.closed = true;
                    state.pending.extend(state.decoder.finish());
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ListgenError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn chunks(parts: &[&'static str]) -> Vec<Result<Bytes>> {
        parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect()
    }

    #[tokio::test]
    async fn test_decode_yields_events_in_order() {
        let body = stream::iter(chunks(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: {not valid json\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\ndata: [DONE]\n\n",
        ]));

        let events: Vec<_> = decode(body).map(|e| e.unwrap()).collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::ContentFragment("Hi".to_string()),
                StreamEvent::Malformed("{not valid json".to_string()),
                StreamEvent::ContentFragment(" there".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_decode_stops_pulling_after_done() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let body = stream::iter(chunks(&[
            "data: [DONE]\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n",
        ]))
        .inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let events: Vec<_> = decode(body).collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decode_surfaces_transport_error_last() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n",
            )),
            Err(ListgenError::network("connection reset")),
            Ok(Bytes::from_static(b"data: [DONE]\n")),
        ]);

        let events: Vec<_> = decode(body).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Ok(StreamEvent::ContentFragment(ref t)) if t == "partial"
        ));
        assert!(matches!(events[1], Err(ListgenError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_decode_flushes_tail_on_close() {
        let body = stream::iter(chunks(&["data: {\"choices\":[{\"delta\":{\"content\":\"end\"}}]}"]));
        let events: Vec<_> = decode(body).map(|e| e.unwrap()).collect().await;
        assert_eq!(events, vec![StreamEvent::ContentFragment("end".to_string())]);
    }
}
