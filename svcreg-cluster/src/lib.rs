//! Cluster membership for svcreg
//!
//! Tracks which of a set of interchangeable registry endpoints are currently
//! considered healthy and hands out one of them per request attempt.
//!
//! ## Features
//!
//! - **Endpoint parsing** - Comma-separated base URL lists, validated up front
//! - **Selection strategies** - Sticky, round-robin, or random
//! - **Failure marking** - Callers report members that did not answer
//! - **Health probing** - Optional active checks that bring members back
//!
//! ## Quick Start
//!
//! ```rust
//! use svcreg_cluster::{ClusterMembership, HttpCluster};
//!
//! let cluster = HttpCluster::new("http://10.0.0.1:8000,http://10.0.0.2:8000", "")?;
//!
//! let member = cluster.select_member()?;
//! assert_eq!(member, "http://10.0.0.1:8000");
//!
//! // The member did not answer: the next selection moves on.
//! cluster.mark_unhealthy(&member);
//! assert_eq!(cluster.select_member()?, "http://10.0.0.2:8000");
//! # Ok::<(), svcreg_cluster::ClusterError>(())
//! ```

pub mod error;
pub mod http;
pub mod membership;

pub use error::{ClusterError, Result};
pub use http::HttpCluster;
pub use membership::{ClusterMembership, SelectionStrategy};
