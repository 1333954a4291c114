//! Cluster membership errors.

use thiserror::Error;

/// Result type for membership operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Cluster membership errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// An endpoint could not be used as a member base URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Every configured member is currently marked unhealthy.
    #[error("No healthy member available ({members} configured)")]
    NoHealthyMember {
        /// Number of configured members.
        members: usize,
    },
}
