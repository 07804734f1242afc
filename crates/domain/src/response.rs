//! Response specification type

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{DomainError, DomainResult};

/// HTTP response as seen by the core.
///
/// Carries the raw status, headers and body; no status is interpreted
/// here beyond the category helpers.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Wall-clock time the request took.
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a response from raw parts.
    #[must_use]
    pub const fn new(
        status: u16,
        headers: HashMap<String, String>,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            duration,
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for the 401 status, the sole refresh trigger.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Returns true for 4xx statuses.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Returns true for 5xx statuses.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Returns the body as a lossy UTF-8 string.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Decodes the body as JSON into the given type.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the body is not valid JSON
    /// of the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> DomainResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Parses the body as an untyped JSON value, if possible.
    #[must_use]
    pub fn body_as_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Extracts the server-provided error message, if the body carries one.
    ///
    /// API error bodies follow the `{ "message": "..." }` convention.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.body_as_json()
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(|m| m.as_str())
            .map(String::from)
    }
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            status: 0,
            headers: HashMap::new(),
            body: Vec::new(),
            duration: Duration::ZERO,
        }
    }
}
