//! Incremental decoding of newline-delimited JSON response bodies.
//!
//! [`NdjsonDecoder`] is the state machine shared by both front ends:
//! [`decode_ndjson`] drives a body and calls back once per record, and
//! [`NdjsonStream`] exposes the same records as a [`Stream`].

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::Result;

mod cancel;
mod decoder;
mod parser;

pub use cancel::until_cancelled;
pub use decoder::NdjsonDecoder;
pub use parser::NdjsonStream;

/// A boxed stream of response body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Reads `body` to the end, invoking `on_record` for every NDJSON record.
///
/// Records are delivered in stream order, one at a time: the callback for a
/// record returns before the next line is parsed. Blank lines are skipped and
/// an unterminated last line is parsed once the body ends.
///
/// # Errors
///
/// - [`Error::MalformedRecord`](crate::Error::MalformedRecord) for the first
///   line that is not valid JSON for `T`. Nothing after it is processed.
/// - Any error yielded by `body` itself (transport failure, cancellation),
///   returned unchanged.
pub async fn decode_ndjson<S, T, F>(mut body: S, mut on_record: F) -> Result<()>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    T: DeserializeOwned,
    F: FnMut(T),
{
    let mut decoder = NdjsonDecoder::new();

    while let Some(chunk) = body.next().await {
        decoder.feed(&chunk?, &mut on_record)?;
    }

    decoder.finish(&mut on_record)
}
