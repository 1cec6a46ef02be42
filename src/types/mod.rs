//! Contains data structures for requests and responses to the Ollama API.
//!
//! Model listings and stream records are kept as raw JSON by default; the
//! typed structs here are conveniences for callers that want them.

pub mod generate;
mod http;

pub use http::*;

use serde::{Deserialize, Serialize};

/// Error body returned by the server, e.g. `{"error":"model 'x' not found"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OllamaError {
    pub error: String,
}
