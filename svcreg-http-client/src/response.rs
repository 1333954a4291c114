//! Call outcome.

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

/// The status and buffered body produced by one attempt.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    status: StatusCode,
    body: Bytes,
    member: String,
}

impl CallOutcome {
    /// Create an outcome from a status and body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            member: String::new(),
        }
    }

    /// Record which member answered.
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = member.into();
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The member that produced this outcome.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Check if the body is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}
