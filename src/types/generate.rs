//! Contains all data structures that are particularly used for the generate API

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::stream::{decode_ndjson, ByteStream, NdjsonStream};
use crate::Result;

/// A request to `/api/generate`.
///
/// Only `model` and `prompt` are named; every other field (`stream`,
/// `system`, `options`, ...) lives in `extra` and is sent verbatim at the top
/// level of the JSON body.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// The name of the model to use for generation (e.g., "llama3.2").
    pub model: String,
    /// The prompt for the model.
    pub prompt: String,
    /// Additional top-level fields, serialized as-is. Must not contain
    /// `model` or `prompt`; [`field`](Self::field) keeps it that way.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerateRequest {
    /// Creates a new [`GenerateRequest`].
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            extra: Map::new(),
        }
    }

    /// Sets an arbitrary top-level field of the request body.
    ///
    /// `model` and `prompt` are written to the named fields instead of
    /// `extra`, so the body never carries them twice. A non-string value for
    /// either is stored as its JSON text.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "model" => self.model = into_text(value),
            "prompt" => self.prompt = into_text(value),
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Sets the `options` object (temperature, num_ctx, seed, ...).
    pub fn options(self, options: Value) -> Self {
        self.field("options", options)
    }

    /// Sets the system message for the request.
    pub fn system(self, system: impl Into<String>) -> Self {
        self.field("system", system.into())
    }

    /// Sets the `stream` flag. The server streams by default when it is absent.
    pub fn stream(self, stream: bool) -> Self {
        self.field("stream", stream)
    }
}

fn into_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// One record of a streaming generation response.
///
/// Records are opaque JSON by default; decode into this type with
/// [`GenerateStream::records`] or [`GenerateStream::for_each_record`] when
/// the server speaks the usual Ollama shape.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct GenerateChunk {
    /// The name of the model that generated the response.
    #[serde(default)]
    pub model: String,
    /// The timestamp when the chunk was created.
    #[serde(default)]
    pub created_at: String,
    /// The generated text of this chunk.
    #[serde(default)]
    pub response: String,
    /// The model's internal "thinking" text, if enabled.
    #[serde(default)]
    pub thinking: String,
    /// Set on the final chunk.
    #[serde(default)]
    pub done: bool,
    /// The reason why the generation finished (e.g., "stop", "length").
    #[serde(default)]
    pub done_reason: Option<String>,
    /// The total duration of the generation process in nanoseconds.
    #[serde(default)]
    pub total_duration: u64,
    /// The duration spent loading the model in nanoseconds.
    #[serde(default)]
    pub load_duration: u64,
    /// The number of tokens in the prompt that were evaluated.
    #[serde(default)]
    pub prompt_eval_count: u64,
    /// The duration spent evaluating the prompt in nanoseconds.
    #[serde(default)]
    pub prompt_eval_duration: u64,
    /// The number of tokens generated.
    #[serde(default)]
    pub eval_count: u64,
    /// The duration spent generating tokens in nanoseconds.
    #[serde(default)]
    pub eval_duration: u64,
}

/// The in-flight body of a generation response, not yet consumed.
///
/// Yields raw byte chunks. If the request's cancellation token fires while
/// the body is being read, the next item is [`Error::Cancelled`](crate::Error::Cancelled).
pub struct GenerateStream {
    pub inner: ByteStream,
}

impl GenerateStream {
    pub fn new(inner: ByteStream) -> Self {
        Self { inner }
    }

    /// Drives the body through the NDJSON decoder, calling `on_record` once
    /// per record in stream order. See [`decode_ndjson`].
    pub async fn for_each_record<T, F>(self, on_record: F) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        decode_ndjson(self.inner, on_record).await
    }

    /// Turns the body into a stream of decoded records.
    pub fn records<T>(self) -> NdjsonStream<ByteStream, T>
    where
        T: DeserializeOwned,
    {
        NdjsonStream::new(self.inner)
    }
}

impl Stream for GenerateStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
