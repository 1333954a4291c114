//! Registry error taxonomy.

use std::time::Duration;
use svcreg_cluster::ClusterError;
use svcreg_http_client::HttpClientError;
use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Every way a registry operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The configured base URL(s) are malformed.
    #[error("Invalid registry endpoint: {0}")]
    InvalidEndpoint(String),

    /// No healthy cluster member could serve the call.
    #[error("All registry endpoints are unavailable: {0}")]
    ClusterUnavailable(String),

    /// The server answered 404.
    #[error("The resource does not exist")]
    ResourceNotFound,

    /// The server's answer could not be trusted or decoded.
    #[error("Invalid response from registry: {0}")]
    InvalidResponse(String),

    /// The server rejected the call with a message.
    #[error("Registry error ({status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server.
        message: String,
    },

    /// A time limit elapsed before a response arrived.
    #[error("The operation timed out after {0:?}")]
    Timeout(Duration),

    /// A caller-supplied value failed a precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RegistryError {
    /// The server-reported message, for [`ServerError`](Self::ServerError).
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ServerError { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound)
    }
}

impl From<ClusterError> for RegistryError {
    fn from(error: ClusterError) -> Self {
        match error {
            ClusterError::InvalidEndpoint(reason) => Self::InvalidEndpoint(reason),
            unavailable @ ClusterError::NoHealthyMember { .. } => {
                Self::ClusterUnavailable(unavailable.to_string())
            }
        }
    }
}

impl From<HttpClientError> for RegistryError {
    fn from(error: HttpClientError) -> Self {
        match error {
            HttpClientError::ClusterUnavailable { .. } | HttpClientError::Connection(_) => {
                Self::ClusterUnavailable(error.to_string())
            }
            HttpClientError::Timeout(elapsed) => Self::Timeout(elapsed),
            HttpClientError::Body(reason) => Self::InvalidResponse(reason),
            HttpClientError::InvalidUrl(reason) => Self::InvalidEndpoint(reason),
            HttpClientError::RequestBuild(reason) => Self::InvalidArgument(reason),
            HttpClientError::Json(e) => Self::InvalidArgument(e.to_string()),
        }
    }
}
