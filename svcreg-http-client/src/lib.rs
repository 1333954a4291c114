//! # svcreg HTTP Client
//!
//! The transport layer of the svcreg registry client: executes one logical
//! JSON call against a cluster of interchangeable endpoints, moving to another
//! member when the selected one does not answer.
//!
//! ## Features
//!
//! - **Bounded failover**: One attempt per member by default, configurable cap
//! - **Backoff**: Optional delay between failover attempts
//! - **Timeouts**: Per-attempt timeout and an optional whole-call deadline
//! - **Pluggable execution**: Any [`HttpExecutor`] can stand in for `reqwest`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svcreg_cluster::HttpCluster;
//! use svcreg_http_client::{CallRequest, ClusterClient, HttpClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cluster = HttpCluster::new("http://10.0.0.1:8000,http://10.0.0.2:8000", "")?;
//!     let client = ClusterClient::new(Arc::new(cluster), HttpClientConfig::default())?;
//!
//!     let outcome = client.call(CallRequest::get("api/services")).await?;
//!     println!("{} answered {}", outcome.member(), outcome.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod executor;
mod failover;
mod request;
mod response;

pub use client::ClusterClient;
pub use config::{DEFAULT_TIMEOUT, HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use failover::{BackoffStrategy, FailoverConfig};
pub use request::CallRequest;
pub use response::CallOutcome;

// Re-export common types
pub use bytes::Bytes;
pub use http::{Method, StatusCode};
