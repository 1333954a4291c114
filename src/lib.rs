// svcreg - A client for clustered service-registry HTTP APIs
//
// This library creates, lists, updates and deletes service records against a
// cluster of interchangeable registry endpoints, failing over transparently
// when an endpoint stops answering.

//! # Quick Start
//!
//! ```rust,no_run
//! use svcreg::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> svcreg::Result<()> {
//!     let config = Config::builder()
//!         .url("http://10.0.0.1:8000,http://10.0.0.2:8000")
//!         .build();
//!     let registry = RegistryClient::new(config)?;
//!
//!     registry.create_service(&Service::new("billing", "allow:ops")).await?;
//!     assert!(registry.has_service("billing").await?);
//!
//!     for (name, service) in registry.all_services().await? {
//!         println!("{name}: {}", service.acl);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classify;
mod client;
mod config;
mod error;
mod service;

pub use client::{Registry, RegistryClient};
pub use config::{Config, ConfigBuilder, DEFAULT_HEALTH_CHECK_INTERVAL, DEFAULT_URL};
pub use error::{RegistryError, Result};
pub use service::{SERVICES_URI, Service};

// Re-export member crates
pub use svcreg_cluster;
pub use svcreg_http_client;
pub use svcreg_log;

pub use svcreg_cluster::{ClusterMembership, HttpCluster, SelectionStrategy};
pub use svcreg_http_client::{BackoffStrategy, FailoverConfig, HttpClientConfig, HttpExecutor};
pub use svcreg_log::{LogConfig, LogOutput};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Config,
        LogOutput,
        Registry,
        RegistryClient,
        RegistryError,
        Service,
    };
}
