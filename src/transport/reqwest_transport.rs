#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use crate::config::Config;
use crate::stream::ByteStream;
use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse, HttpVerb, OllamaError};
use crate::{Error, Result};

/// A [`Transport`] implementation that uses the `reqwest` crate for making HTTP requests.
///
/// This is the default transport used by [`OllamaClient`](crate::OllamaClient) if no custom transport
/// is provided. Requests carry no credentials and no timeout; callers abort
/// them through the cancellation token passed to
/// [`OllamaClient::generate`](crate::OllamaClient::generate).
pub struct ReqwestTransport {
    client: Client,
    config: Config,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport` talking to `config`'s base address.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`] if the `reqwest` client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Helper to build and send a reqwest request, handling common logic.
    async fn build_and_send_request(&self, request: HttpRequest) -> Result<reqwest::Response> {
        let url = self.config.endpoint(&request.url)?;

        let mut request_builder = match request.verb {
            HttpVerb::GET => self.client.get(url),
            HttpVerb::POST => self.client.post(url),
        };

        if let Some(body) = request.body {
            // sets `Content-Type: application/json`
            request_builder = request_builder.json(&body);
        }

        let response = request_builder.send().await.map_err(Error::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            #[cfg(feature = "tracing")]
            tracing::warn!(%status, %message, "server rejected request");
            return Err(Error::Server(format!("{status}: {message}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    /// Sends a non-streaming HTTP request using `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Transport`] if the request fails or the response cannot be read,
    /// and an [`Error::Server`] for a non-success status.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(url = %request.url)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.build_and_send_request(request).await?;
        let response_bytes = response.bytes().await.map_err(Error::Transport)?;
        Ok(HttpResponse {
            body: Some(response_bytes),
        })
    }

    /// Sends an HTTP request using `reqwest` and returns the body as a stream of chunks.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Transport`] if the request fails or the stream cannot be established,
    /// and an [`Error::Server`] for a non-success status.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(url = %request.url)))]
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<ByteStream> {
        let response = self.build_and_send_request(request).await?;
        let stream = response
            .bytes_stream()
            .map(|item| item.map_err(Error::Transport))
            .boxed();
        Ok(stream)
    }
}
