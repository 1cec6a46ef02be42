use std::sync::{Arc, Mutex};

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self};
use futures::StreamExt;

use crate::stream::ByteStream;
use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse};
use crate::{Error, Result};

/// A mock implementation of the [`Transport`] trait for testing purposes.
///
/// Responses are configured up front and consumed by the first request that
/// asks for them. Every request is recorded and can be inspected with
/// [`MockTransport::requests`].
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Items returned, in order, as the body of the next streaming request.
    stream_items: Arc<Mutex<Vec<Result<Bytes>>>>,
    /// Keep the body open (pending forever) after `stream_items` ran out.
    stall_stream: Arc<Mutex<bool>>,
    /// Never deliver response headers for streaming requests.
    pending_response: Arc<Mutex<bool>>,

    /// Response returned for the next non-streaming request.
    http_response: Arc<Mutex<Option<Result<HttpResponse>>>>,

    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Creates a new, empty [`MockTransport`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Body chunks for the next streaming request, delivered exactly as given.
    pub fn with_stream_chunks<I, B>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let items = chunks.into_iter().map(|chunk| Ok(chunk.into())).collect();
        self.with_stream_items(items)
    }

    /// Body items for the next streaming request, which may include errors.
    pub fn with_stream_items(self, items: Vec<Result<Bytes>>) -> Self {
        *self.stream_items.lock().unwrap() = items;
        self
    }

    /// Leaves the streaming body open after its configured items instead of
    /// ending it.
    pub fn stall_stream(self) -> Self {
        *self.stall_stream.lock().unwrap() = true;
        self
    }

    /// Makes streaming requests wait forever for response headers.
    pub fn with_pending_response(self) -> Self {
        *self.pending_response.lock().unwrap() = true;
        self
    }

    /// Configures the response for the next non-streaming HTTP request.
    pub fn with_http_response(self, response: HttpResponse) -> Self {
        *self.http_response.lock().unwrap() = Some(Ok(response));
        self
    }

    /// Makes the next non-streaming HTTP request fail with `error`.
    pub fn with_http_error(self, error: Error) -> Self {
        *self.http_response.lock().unwrap() = Some(Err(error));
        self
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    /// Returns the configured response, or a response without a body when
    /// none is configured.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);

        let configured = self.http_response.lock().unwrap().take();
        configured.unwrap_or(Ok(HttpResponse { body: None }))
    }

    /// Returns the configured body items as a stream. An empty stream is
    /// returned when nothing is configured.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<ByteStream> {
        self.requests.lock().unwrap().push(request);

        let pending_response = *self.pending_response.lock().unwrap();
        if pending_response {
            return futures::future::pending().await;
        }

        let items = self
            .stream_items
            .lock()
            .unwrap()
            .drain(..)
            .collect::<Vec<_>>();
        let body = stream::iter(items);

        let stall = *self.stall_stream.lock().unwrap();
        if stall {
            Ok(body.chain(stream::pending()).boxed())
        } else {
            Ok(body.boxed())
        }
    }
}
