use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use serde::de::DeserializeOwned;

use crate::stream::NdjsonDecoder;
use crate::{Error, Result};

/// Newline-delimited JSON parser over a byte stream.
///
/// - `S` is the underlying stream that yields `Result<Bytes>`
/// - `T` is the record type expected on every line
///
/// Records come out in the order their lines appear. The first error, from
/// the body or from a malformed line, is yielded once after the records that
/// preceded it, and the stream ends there.
pub struct NdjsonStream<S, T> {
    inner: S,
    decoder: NdjsonDecoder,
    ready: VecDeque<T>,
    failed: Option<Error>,
    done: bool,
}

impl<S, T> NdjsonStream<S, T>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    T: DeserializeOwned,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            decoder: NdjsonDecoder::new(),
            ready: VecDeque::new(),
            failed: None,
            done: false,
        }
    }
}

impl<S, T> Stream for NdjsonStream<S, T>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    T: DeserializeOwned + Unpin,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(record) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(record)));
            }
            if let Some(err) = this.failed.take() {
                this.done = true;
                return Poll::Ready(Some(Err(err)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            let ready = &mut this.ready;
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    if let Err(err) = this.decoder.feed(&bytes, &mut |r| ready.push_back(r)) {
                        this.failed = Some(err);
                    }
                }
                Poll::Ready(Some(Err(err))) => this.failed = Some(err),
                Poll::Ready(None) => {
                    if let Err(err) = this.decoder.finish(&mut |r| ready.push_back(r)) {
                        this.failed = Some(err);
                    }
                    this.done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
