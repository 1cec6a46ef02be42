use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::stream::ByteStream;
use crate::Error;

/// Ties a response body to a cancellation token.
///
/// Chunks pass through unchanged until `token` fires. The next poll after
/// that yields [`Error::Cancelled`] and the stream ends, dropping `body` and
/// with it the underlying connection.
pub fn until_cancelled(body: ByteStream, token: CancellationToken) -> ByteStream {
    stream::unfold(Some((body, token)), |state| async move {
        let (mut body, token) = state?;

        tokio::select! {
            biased;
            _ = token.cancelled() => Some((Err(Error::Cancelled), None)),
            item = body.next() => item.map(|item| (item, Some((body, token)))),
        }
    })
    .boxed()
}
