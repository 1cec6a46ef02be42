use crate::Result;
use bytes::Bytes;
use serde::Serialize;

#[derive(Default, Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub verb: HttpVerb,
    pub body: Option<serde_json::Value>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    #[default]
    GET,
    POST,
}

#[derive(Debug)]
pub struct HttpResponse {
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn get(mut self) -> Self {
        self.verb = HttpVerb::GET;
        self
    }

    pub fn post(mut self) -> Self {
        self.verb = HttpVerb::POST;
        self
    }

    /// Serializes `body` to JSON. Transports send it with
    /// `Content-Type: application/json`.
    pub fn body<T: Serialize>(mut self, body: T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}
