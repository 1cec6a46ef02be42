use reqwest::Url;

use crate::{Error, Result};

/// Environment variable holding the base address of the model-serving host.
pub const HOST_ADDRESS_ENV: &str = "HOST_ADDRESS";

/// Process-wide client configuration.
///
/// Built once at startup and never mutated afterwards. It is handed to the
/// [`OllamaClientBuilder`](crate::builder::OllamaClientBuilder) explicitly
/// instead of being looked up on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: Url,
}

impl Config {
    /// Creates a configuration from a base address such as `http://127.0.0.1:11434`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Config`] if the address is not an absolute URL, or
    /// if it carries a query or fragment, which endpoint paths cannot follow.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref().trim();
        if raw.is_empty() {
            return Err(Error::Config("base address is empty".into()));
        }

        let base_url = Url::parse(raw)
            .map_err(|e| Error::Config(format!("Invalid base address {raw:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Base address {raw:?} cannot be used as a base URL"
            )));
        }

        if base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(Error::Config(format!(
                "Base address {raw:?} must not have a query or fragment"
            )));
        }

        Ok(Self { base_url })
    }

    /// Reads the base address from the `HOST_ADDRESS` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Config`] if the variable is unset, empty or not a URL.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(HOST_ADDRESS_ENV).map_err(|_| {
            Error::Config(format!("{HOST_ADDRESS_ENV} environment variable is not set"))
        })?;
        Self::new(raw)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL of an API endpoint by appending `path` to the base address.
    ///
    /// Any path prefix on the base address is kept, so a server mounted at
    /// `http://proxy/ollama` serves tags at `http://proxy/ollama/api/tags`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| Error::Client(format!("Invalid endpoint URL for {path:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_to_base() {
        let config = Config::new("http://localhost:11434").unwrap();
        assert_eq!(
            config.endpoint("/api/tags").unwrap().as_str(),
            "http://localhost:11434/api/tags"
        );
    }

    #[test]
    fn endpoint_keeps_path_prefix_and_trims_slashes() {
        let config = Config::new("https://gateway.example.com/ollama/").unwrap();
        assert_eq!(
            config.endpoint("/api/generate").unwrap().as_str(),
            "https://gateway.example.com/ollama/api/generate"
        );
    }

    #[test]
    fn rejects_empty_and_relative_addresses() {
        assert!(matches!(Config::new("   "), Err(Error::Config(_))));
        assert!(matches!(Config::new("localhost"), Err(Error::Config(_))));
        assert!(matches!(Config::new("/api"), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_query_and_fragment() {
        assert!(matches!(Config::new("http://h/?x=1"), Err(Error::Config(_))));
        assert!(matches!(Config::new("http://h/#top"), Err(Error::Config(_))));
        assert!(matches!(Config::new("http://h/?"), Err(Error::Config(_))));
    }
}
