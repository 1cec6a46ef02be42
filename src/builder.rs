use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::Config;
use crate::transport::{ReqwestTransport, Transport};
use crate::{OllamaClient, Result};

/// A builder for constructing an [`OllamaClient`].
///
/// - Uses an explicit [`Config`] or base URL when given, otherwise reads the
///   `HOST_ADDRESS` environment variable. There is no fallback address.
/// - Uses `reqwest`-based transport by default - [`ReqwestTransport`].
pub struct OllamaClientBuilder {
    config: Option<Config>,
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport + Send + Sync>>,
}

impl OllamaClientBuilder {
    /// Creates a new [`OllamaClientBuilder`]. This method is called by [`OllamaClient::builder`]
    pub(crate) fn new() -> Self {
        OllamaClientBuilder {
            config: None,
            base_url: None,
            transport: None,
        }
    }

    /// Uses a configuration that was already loaded, e.g. by [`Config::from_env`]
    /// at startup. Takes precedence over [`base_url`](Self::base_url).
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the base address of the server, e.g. `http://127.0.0.1:11434`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a custom transport implementation for the client.
    ///
    /// This allows for using different HTTP clients or mock implementations for testing.
    /// If not set, a `reqwest`-based transport \([`ReqwestTransport`]\) will be used.
    ///
    /// For testing, you can use [`MockTransport`](crate::transport::MockTransport)
    /// or your own mock [`Transport`] implementations.
    pub fn transport(mut self, transport: Arc<dyn Transport + Send + Sync>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the [`OllamaClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Config`](variant@crate::Error::Config) if no usable base address
    /// is available, or an [`Error::Client`](variant@crate::Error::Client) if
    /// [`ReqwestTransport`] cannot be initialized.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn build(self) -> Result<OllamaClient> {
        let config = match (self.config, self.base_url) {
            (Some(config), _) => config,
            (None, Some(base_url)) => Config::new(base_url)?,
            (None, None) => Config::from_env()?,
        };

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(config.clone())?),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(base_url = %config.base_url(), "client configured");

        Ok(OllamaClient { config, transport })
    }
}
