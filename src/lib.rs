//! A small async client for Ollama-style model servers.
//!
//! It lists the models a host offers and starts generation jobs whose
//! responses arrive as newline-delimited JSON. The [`stream`] module turns
//! such a body into records, either through a callback ([`stream::decode_ndjson`])
//! or as a [`futures::Stream`] ([`stream::NdjsonStream`]).

use std::sync::Arc;

use thiserror::Error;

use self::config::Config;
use self::transport::Transport;

pub mod builder;
pub mod client;
pub mod config;
pub mod stream;
pub mod transport;
pub mod types;

#[derive(Clone)]
pub struct OllamaClient {
    config: Config,
    transport: Arc<dyn Transport + Send + Sync>,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Malformed stream record {record:?}: {source}")]
    MalformedRecord {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Failed to fetch models: {0}")]
    ListModels(#[source] Box<Error>),

    #[error("Request cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `true` if the failure was caused by the caller's cancellation
    /// token rather than by the server or the network.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::ListModels(inner) => inner.is_cancelled(),
            _ => false,
        }
    }
}
