//! Transport error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// No member could be used for the call.
    #[error("Cluster unavailable after {attempts} attempts: {message}")]
    ClusterUnavailable {
        /// Number of attempts made.
        attempts: u32,
        /// Why the last attempt could not proceed.
        message: String,
    },

    /// The member did not produce an HTTP response.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A time limit elapsed.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Headers arrived but the body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpClientError {
    /// Check if the call should move on to another member.
    pub fn is_failover(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if the cluster had no usable member.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ClusterUnavailable { .. })
    }
}
