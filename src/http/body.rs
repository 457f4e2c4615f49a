//! Bounded, streaming request-body reader.
//!
//! # Responsibilities
//! - Resolve bodyless methods immediately, without touching the stream
//! - Accumulate data frames for body-carrying methods
//! - Enforce the body ceiling after every chunk, not at end of stream
//!
//! # Design Decisions
//! - Bodyless methods never poll the stream: attaching-and-ignoring would
//!   change transport backpressure, so the frames stay unconsumed
//! - An oversized read fails with no partial body; the caller's error
//!   propagation is what tears the connection down
//! - Zero data frames is an empty body, not an absent one

use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::Method;
use thiserror::Error;

use crate::observability::metrics;

/// Hard ceiling on buffered request-body bytes.
pub const DEFAULT_BODY_CEILING: usize = 1_000_000;

/// Errors from reading a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// Body grew past the ceiling mid-stream.
    #[error("request body exceeded {ceiling} bytes")]
    Oversized { ceiling: usize },

    /// The transport failed while streaming the body.
    #[error("body stream failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// True for methods whose requests carry a payload.
fn carries_body(method: &Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH")
}

/// Read a request body to completion, bounded by `ceiling`.
///
/// Bodyless methods resolve to `Ok(None)` with the stream never polled.
/// Everything else is buffered frame by frame; the ceiling check runs
/// after each append so an oversized stream is cut off promptly rather
/// than after it has been fully buffered.
pub async fn read_body<B>(
    method: &Method,
    mut body: B,
    ceiling: usize,
) -> Result<Option<Bytes>, BodyError>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    if !carries_body(method) {
        return Ok(None);
    }

    let mut buffer = BytesMut::new();
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| BodyError::Transport(Box::new(e)))?;
        if let Ok(data) = frame.into_data() {
            buffer.extend_from_slice(&data);
            if buffer.len() > ceiling {
                metrics::record_oversized_body();
                return Err(BodyError::Oversized { ceiling });
            }
        }
    }
    Ok(Some(buffer.freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use http_body_util::{Empty, StreamBody};
    use hyper::body::Frame;
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    fn chunked(
        chunks: Vec<&'static [u8]>,
    ) -> StreamBody<stream::Iter<std::vec::IntoIter<Result<Frame<Bytes>, Infallible>>>> {
        StreamBody::new(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Frame::data(Bytes::from_static(c))))
                .collect::<Vec<_>>()
                .into_iter(),
        ))
    }

    /// Body that fails the test if it is ever polled.
    struct UntouchedBody;

    impl Body for UntouchedBody {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            unreachable!("bodyless read must not poll the stream")
        }
    }

    #[tokio::test]
    async fn bodyless_method_never_polls_the_stream() {
        let body = read_body(&Method::GET, UntouchedBody, DEFAULT_BODY_CEILING)
            .await
            .unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn chunks_accumulate_in_order() {
        let body = read_body(&Method::POST, chunked(vec![b"hel", b"lo"]), DEFAULT_BODY_CEILING)
            .await
            .unwrap();
        assert_eq!(body.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn empty_body_is_an_empty_buffer_not_absent() {
        let body = read_body(&Method::POST, Empty::<Bytes>::new(), DEFAULT_BODY_CEILING)
            .await
            .unwrap();
        assert_eq!(body.as_deref(), Some(&b""[..]));
    }

    #[tokio::test]
    async fn body_exactly_at_the_ceiling_is_accepted() {
        let body = read_body(&Method::PUT, chunked(vec![&[0u8; 6], &[0u8; 4]]), 10)
            .await
            .unwrap();
        assert_eq!(body.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn ceiling_check_runs_after_every_chunk() {
        // The third pull panics: an oversized stream must be cut off as
        // soon as the running total crosses the ceiling.
        let mut pulls = 0;
        let frames = std::iter::from_fn(move || {
            pulls += 1;
            match pulls {
                1 | 2 => Some(Ok::<_, Infallible>(Frame::data(Bytes::from(vec![0u8; 6])))),
                _ => panic!("stream polled past the oversized chunk"),
            }
        });
        let body = StreamBody::new(stream::iter(frames));

        let err = read_body(&Method::POST, body, 10).await.unwrap_err();
        assert!(matches!(err, BodyError::Oversized { ceiling: 10 }));
    }
}
