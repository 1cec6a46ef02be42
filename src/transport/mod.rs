use async_trait::async_trait;

use crate::stream::ByteStream;
use crate::types::{HttpRequest, HttpResponse};
use crate::Result;

mod mock_transport;
mod reqwest_transport;

pub use mock_transport::MockTransport;
pub use reqwest_transport::ReqwestTransport;

/// The HTTP seam of the client.
///
/// `request.url` is an API path such as `/api/tags`; implementations resolve
/// it against their base address.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a non-streaming HTTP request and returns the whole response body.
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Sends an HTTP request and returns once the response headers arrive.
    /// The body is handed back unread as a stream of chunks.
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<ByteStream>;
}
