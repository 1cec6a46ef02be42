use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "metrics")]
use metrics::counter;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::builder::OllamaClientBuilder;
use crate::config::Config;
use crate::stream::until_cancelled;
use crate::types::generate::{GenerateRequest, GenerateStream};
use crate::types::HttpRequest;
use crate::OllamaClient;
use crate::{Error, Result};

impl OllamaClient {
    pub fn builder() -> OllamaClientBuilder {
        OllamaClientBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches `/api/tags` and returns the parsed body unchanged.
    ///
    /// Meant as a startup self-check: every failure, whether network, HTTP
    /// status or body, comes back wrapped in [`Error::ListModels`] so the
    /// caller can decide to abort.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn list_models(&self) -> Result<Value> {
        #[cfg(feature = "metrics")]
        counter!("ollama_client.list_models_requests_total").increment(1);

        self.fetch_models()
            .await
            .map_err(|e| Error::ListModels(Box::new(e)))
    }

    async fn fetch_models(&self) -> Result<Value> {
        let request = HttpRequest::new("/api/tags").get();

        let response = self.transport.send_http_request(request).await?;

        match response.body {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Err(Error::Protocol("Missing response body".into())),
        }
    }

    /// Starts a generation job and returns its response body unread.
    ///
    /// The request is POSTed to `/api/generate` as JSON. Cancelling `cancel`
    /// aborts the call while waiting for headers, and afterwards makes the
    /// returned stream yield [`Error::Cancelled`] on its next poll.
    ///
    /// No retries and no timeout are applied.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request, cancel), fields(model = %request.model)))]
    pub async fn generate(
        &self,
        request: GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<GenerateStream> {
        #[cfg(feature = "metrics")]
        counter!("ollama_client.generate_requests_total").increment(1);

        let request = HttpRequest::new("/api/generate").post().body(request)?;

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("generation cancelled before response headers");
                return Err(Error::Cancelled);
            }
            body = self.transport.send_http_stream_request(request) => body?,
        };

        Ok(GenerateStream::new(until_cancelled(body, cancel)))
    }

    /// Starts a generation job and feeds every record of its response to
    /// `on_record`, in order, until the stream ends.
    ///
    /// Shorthand for [`generate`](Self::generate) followed by
    /// [`GenerateStream::for_each_record`].
    pub async fn generate_with<T, F>(
        &self,
        request: GenerateRequest,
        cancel: CancellationToken,
        on_record: F,
    ) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        self.generate(request, cancel)
            .await?
            .for_each_record(on_record)
            .await
    }
}
