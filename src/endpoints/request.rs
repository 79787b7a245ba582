//! Transport-neutral request and response types.
//!
//! The engine does not speak HTTP itself; the embedding server maps its
//! framework's request type onto [`ScimRequest`] and the returned
//! [`ScimResponse`] back. Errors are serialized in exactly one place,
//! [`ScimResponse::from_error`], so every failure produces the standard
//! error message body.

use crate::error::ScimError;
use crate::resource_type::HttpMethod;
use serde_json::Value;
use std::collections::HashMap;

pub const LOCATION_HEADER: &str = "Location";
pub const ETAG_HEADER: &str = "ETag";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// The SCIM media type (RFC 7644 §3.1).
pub const SCIM_CONTENT_TYPE: &str = "application/scim+json";

#[derive(Debug, Clone)]
pub struct ScimRequest {
    pub method: HttpMethod,
    /// Absolute URL or bare path, query string included.
    pub uri: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl ScimRequest {
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ScimResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl ScimResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        let mut headers = HashMap::new();
        if body.is_some() {
            headers.insert(
                CONTENT_TYPE_HEADER.to_string(),
                SCIM_CONTENT_TYPE.to_string(),
            );
        }
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    pub fn created(body: Value) -> Self {
        Self::new(201, Some(body))
    }

    pub fn no_content() -> Self {
        Self::new(204, None)
    }

    pub fn from_error(error: &ScimError) -> Self {
        log::debug!("request failed with status {}: {error}", error.status());
        // 304 carries no body by definition
        if matches!(error, ScimError::NotModified) {
            return Self::new(304, None);
        }
        Self::new(error.status(), Some(error.to_error_response()))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
