//! Call description.

use crate::Result;
use bytes::Bytes;
use http::Method;
use serde::Serialize;

/// One logical call: a method, a path relative to the member, and a body.
#[derive(Debug, Clone)]
pub struct CallRequest {
    method: Method,
    path: String,
    body: Option<Bytes>,
}

impl CallRequest {
    /// Create a call with no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    /// Create a GET call.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST call.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT call.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a DELETE call.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set the body as raw bytes.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the body to the JSON encoding of `value`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        Ok(self)
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path relative to a member.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The encoded body, if any.
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// The target address on `member`.
    ///
    /// The path is appended verbatim; callers escape anything that needs it.
    pub fn url_for(&self, member: &str) -> String {
        format!("{}/{}", member, self.path)
    }
}
