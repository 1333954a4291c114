//! Registry operations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use svcreg_cluster::{ClusterMembership, HttpCluster};
use svcreg_http_client::{CallOutcome, CallRequest, ClusterClient, HttpExecutor, ReqwestExecutor};
use svcreg_log::LogOutput;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::service::SERVICES_URI;
use crate::{Config, RegistryError, Result, Service};

/// Operations on the service registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Whether a service named `name` is registered.
    ///
    /// True only when the listing holds an entry under `name` whose `id` is
    /// also `name`.
    async fn has_service(&self, name: &str) -> Result<bool>;

    /// Every registered service, keyed by name.
    async fn all_services(&self) -> Result<HashMap<String, Service>>;

    /// Register `service` and return the record the registry stored.
    async fn create_service(&self, service: &Service) -> Result<Service>;

    /// Replace the record for `service.id`.
    async fn update_service(&self, service: &Service) -> Result<Option<Service>>;

    /// Remove the service named `name`.
    async fn delete_service(&self, name: &str) -> Result<Option<Service>>;
}

/// [`Registry`] over HTTP against a cluster of registry endpoints.
///
/// Cloning is cheap; clones share the transport and membership state.
///
/// A client built with [`new`](Self::new) keeps members from staying down
/// forever. With a health-check path it probes downed members in the
/// background. Without one, a call that finds every member down retries all
/// of them.
#[derive(Clone)]
pub struct RegistryClient {
    transport: ClusterClient,
    cluster: Option<Arc<HttpCluster>>,
    probing: bool,
    log: LogOutput,
}

impl RegistryClient {
    /// Create a client from `config`.
    ///
    /// Fails with [`RegistryError::InvalidEndpoint`] when the URL list does
    /// not parse. The health checker is only started when a Tokio runtime is
    /// running; it stops once the last clone of the client is dropped.
    pub fn new(config: Config) -> Result<Self> {
        let log = config.log.clone();
        log.in_scope(|| Self::connect(config))
    }

    fn connect(config: Config) -> Result<Self> {
        let cluster = Arc::new(
            HttpCluster::new(&config.url, config.health_check_path.as_str())?
                .with_strategy(config.strategy),
        );
        let executor = ReqwestExecutor::new(&config.http)?;

        let probing = if config.health_check_path.is_empty() {
            false
        } else if tokio::runtime::Handle::try_current().is_ok() {
            cluster
                .spawn_health_checker(executor.inner().clone(), config.health_check_interval)
                .is_some()
        } else {
            warn!("No Tokio runtime running, health probing disabled");
            false
        };

        let membership: Arc<dyn ClusterMembership> = cluster.clone();
        let transport = ClusterClient::with_executor(membership, Arc::new(executor), config.http);

        debug!(members = %config.url, probing, "Registry client created");
        Ok(Self {
            transport,
            cluster: Some(cluster),
            probing,
            log: config.log,
        })
    }

    /// Create a client from explicit collaborators.
    ///
    /// `config.url`, `config.health_check_path` and `config.strategy` are
    /// ignored; `membership` decides where calls go and owns member recovery.
    pub fn with_parts(
        membership: Arc<dyn ClusterMembership>,
        executor: Arc<dyn HttpExecutor>,
        config: Config,
    ) -> Self {
        Self {
            transport: ClusterClient::with_executor(membership, executor, config.http),
            cluster: None,
            probing: false,
            log: config.log,
        }
    }

    /// Get the membership provider.
    pub fn membership(&self) -> &Arc<dyn ClusterMembership> {
        self.transport.membership()
    }

    /// The cluster built by [`new`](Self::new), for health inspection and
    /// manual recovery. `None` for clients built with
    /// [`with_parts`](Self::with_parts).
    pub fn cluster(&self) -> Option<&Arc<HttpCluster>> {
        self.cluster.as_ref()
    }

    /// Whether a background health checker is running for this client.
    pub fn is_probing(&self) -> bool {
        self.probing
    }

    /// Get the log output.
    pub fn log_output(&self) -> &LogOutput {
        &self.log
    }

    async fn call(&self, request: CallRequest) -> Result<CallOutcome> {
        if !self.probing {
            if let Some(cluster) = &self.cluster {
                cluster.revive_if_exhausted();
            }
        }
        Ok(self.transport.call(request).await?)
    }

    async fn list(&self) -> Result<HashMap<String, Service>> {
        let outcome = self.call(CallRequest::get(SERVICES_URI)).await?;
        let services = classify::<HashMap<String, Service>>(&outcome)?.unwrap_or_default();
        debug!(count = services.len(), "Listed services");
        Ok(services)
    }

    async fn contains(&self, name: &str) -> Result<bool> {
        let services = self.list().await?;
        let found = services.get(name).is_some_and(|service| service.id == name);
        debug!(name, found, "Checked service");
        Ok(found)
    }

    async fn create(&self, service: &Service) -> Result<Service> {
        require_id(&service.id)?;
        let request = CallRequest::post(SERVICES_URI).json(service)?;
        let outcome = self.call(request).await?;
        let created = classify::<Service>(&outcome)?.ok_or_else(|| {
            RegistryError::InvalidResponse("empty response to create".to_string())
        })?;
        debug!(id = %created.id, "Created service");
        Ok(created)
    }

    async fn update(&self, service: &Service) -> Result<Option<Service>> {
        require_id(&service.id)?;
        let request = CallRequest::put(Service::item_path(&service.id)).json(service)?;
        let outcome = self.call(request).await?;
        let updated = classify::<Service>(&outcome)?;
        debug!(id = %service.id, returned = updated.is_some(), "Updated service");
        Ok(updated)
    }

    async fn delete(&self, name: &str) -> Result<Option<Service>> {
        require_id(name)?;
        let outcome = self.call(CallRequest::delete(Service::item_path(name))).await?;
        let deleted = classify::<Service>(&outcome)?;
        debug!(name, returned = deleted.is_some(), "Deleted service");
        Ok(deleted)
    }
}

#[async_trait]
impl Registry for RegistryClient {
    async fn has_service(&self, name: &str) -> Result<bool> {
        self.log.scope(self.contains(name)).await
    }

    async fn all_services(&self) -> Result<HashMap<String, Service>> {
        self.log.scope(self.list()).await
    }

    async fn create_service(&self, service: &Service) -> Result<Service> {
        self.log.scope(self.create(service)).await
    }

    async fn update_service(&self, service: &Service) -> Result<Option<Service>> {
        self.log.scope(self.update(service)).await
    }

    async fn delete_service(&self, name: &str) -> Result<Option<Service>> {
        self.log.scope(self.delete(name)).await
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("members", &self.transport.membership().members())
            .field("log", &self.log)
            .finish()
    }
}

fn require_id(id: &str) -> Result<()> {
    if id.is_empty() {
        debug!("Rejected call with empty service id");
        return Err(RegistryError::InvalidArgument(
            "service id must not be empty".to_string(),
        ));
    }
    Ok(())
}
