//! Request descriptors: what to call, with which body, over which transport.

use super::normalizer::{Failure, normalize};
use crate::error::ApiError;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Wire encoding of a request body. Picked from the payload, never by the
/// caller directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Json,
    Multipart,
}

impl Transport {
    pub fn content_type(&self) -> &'static str {
        match self {
            Transport::Json => JSON_CONTENT_TYPE,
            Transport::Multipart => MULTIPART_CONTENT_TYPE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartContent {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: String,
    pub content: PartContent,
}

/// Binary/form body. Kept as plain data so it can be inspected and cloned;
/// turned into a `reqwest` form only when sent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipartBody {
    pub parts: Vec<MultipartPart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart {
            name: name.to_string(),
            content: PartContent::Text(value.into()),
        });
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        self.parts.push(MultipartPart {
            name: name.to_string(),
            content: PartContent::File {
                file_name: file_name.to_string(),
                mime: mime.to_string(),
                bytes,
            },
        });
        self
    }

    pub(crate) fn into_form(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            form = match part.content {
                PartContent::Text(value) => form.text(part.name, value),
                PartContent::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let file = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| {
                            normalize(&Failure::Other {
                                message: Some(format!("Invalid mime type '{}': {}", mime, e)),
                            })
                        })?;
                    form.part(part.name, file)
                }
            };
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartBody),
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value).map(Payload::Json).map_err(|e| {
            normalize(&Failure::Other {
                message: Some(format!("Failed to encode request body: {}", e)),
            })
        })
    }

    pub fn transport(&self) -> Transport {
        match self {
            Payload::Json(_) => Transport::Json,
            Payload::Multipart(_) => Transport::Multipart,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<MultipartBody> for Payload {
    fn from(body: MultipartBody) -> Self {
        Payload::Multipart(body)
    }
}

/// Per-call transport overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub type Query = Vec<(String, String)>;

/// Everything needed to issue one call. Built per call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub endpoint: String,
    pub query: Query,
    pub payload: Option<Payload>,
    pub options: RequestOptions,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: &str) -> Self {
        Self {
            method,
            endpoint: endpoint.to_string(),
            query: Vec::new(),
            payload: None,
            options: RequestOptions::default(),
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_payload(mut self, payload: Option<Payload>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_options(mut self, options: Option<RequestOptions>) -> Self {
        self.options = options.unwrap_or_default();
        self
    }

    pub fn transport(&self) -> Transport {
        self.payload
            .as_ref()
            .map(Payload::transport)
            .unwrap_or(Transport::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transport_follows_payload() {
        let plain = RequestDescriptor::new(Method::POST, "/auth/login")
            .with_payload(Some(json!({"email": "a@b.co"}).into()));
        assert_eq!(plain.transport(), Transport::Json);
        assert_eq!(plain.transport().content_type(), "application/json");

        let upload = RequestDescriptor::new(Method::PATCH, "/auth/profile").with_payload(Some(
            MultipartBody::new()
                .file("avatar", "me.png", "image/png", vec![1, 2, 3])
                .into(),
        ));
        assert_eq!(upload.transport(), Transport::Multipart);
        assert_eq!(upload.transport().content_type(), "multipart/form-data");
    }

    #[test]
    fn test_bodyless_requests_use_json_transport() {
        let descriptor = RequestDescriptor::new(Method::GET, "/auth/profile");
        assert_eq!(descriptor.transport(), Transport::Json);
    }

    #[test]
    fn test_multipart_rejects_bad_mime() {
        let body = MultipartBody::new().file("avatar", "x", "not a mime", vec![]);
        let err = body.into_form().expect_err("mime should be rejected");
        assert_eq!(err.kind, crate::error::ErrorKind::Unknown);
    }

    #[test]
    fn test_options_builder() {
        let options = RequestOptions::default()
            .header("X-Trace", "1")
            .timeout(Duration::from_secs(5));
        assert_eq!(options.headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }
}
