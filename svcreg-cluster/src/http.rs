//! HTTP endpoint cluster.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ClusterError, Result};
use crate::membership::{ClusterMembership, SelectionStrategy};

/// A fixed set of HTTP base URLs with per-member health state.
#[derive(Debug)]
pub struct HttpCluster {
    members: Vec<String>,
    health_check_path: String,
    strategy: SelectionStrategy,
    unhealthy: RwLock<Vec<bool>>,
    cursor: AtomicUsize,
}

impl HttpCluster {
    /// Create a cluster from a comma-separated list of base URLs.
    ///
    /// `health_check_path` is requested relative to each member by
    /// [`probe`](Self::probe); an empty path disables active probing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use svcreg_cluster::HttpCluster;
    ///
    /// let cluster = HttpCluster::new("http://127.0.0.1:8000, http://127.0.0.1:8001/", "status")?;
    /// assert_eq!(cluster.len(), 2);
    /// # Ok::<(), svcreg_cluster::ClusterError>(())
    /// ```
    pub fn new(endpoints: &str, health_check_path: impl Into<String>) -> Result<Self> {
        Self::from_members(endpoints.split(','), health_check_path)
    }

    /// Create a cluster from individual base URLs.
    pub fn from_members<I, S>(endpoints: I, health_check_path: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut members: Vec<String> = Vec::new();
        for endpoint in endpoints {
            let member = parse_member(endpoint.as_ref())?;
            if !members.contains(&member) {
                members.push(member);
            }
        }

        if members.is_empty() {
            return Err(ClusterError::InvalidEndpoint(
                "no endpoints configured".to_string(),
            ));
        }

        let unhealthy = RwLock::new(vec![false; members.len()]);
        Ok(Self {
            members,
            health_check_path: health_check_path.into(),
            strategy: SelectionStrategy::default(),
            unhealthy,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Set the selection strategy.
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The selection strategy in use.
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// The health-check path, empty when probing is disabled.
    pub fn health_check_path(&self) -> &str {
        &self.health_check_path
    }

    /// Number of configured members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; a cluster cannot be built without members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check whether `member` is currently considered healthy.
    pub fn is_healthy(&self, member: &str) -> bool {
        self.index_of(member)
            .map(|index| !self.unhealthy.read()[index])
            .unwrap_or(false)
    }

    /// Bring a member back into rotation.
    pub fn mark_healthy(&self, member: &str) {
        if let Some(index) = self.index_of(member) {
            let mut unhealthy = self.unhealthy.write();
            if unhealthy[index] {
                unhealthy[index] = false;
                info!(member = %self.members[index], "Cluster member marked healthy");
            }
        }
    }

    /// Mark every member healthy again.
    pub fn reset(&self) {
        self.unhealthy.write().iter_mut().for_each(|down| *down = false);
    }

    /// Put every member back into rotation if all of them are marked down.
    ///
    /// Returns whether anything was revived.
    pub fn revive_if_exhausted(&self) -> bool {
        let mut unhealthy = self.unhealthy.write();
        if unhealthy.is_empty() || !unhealthy.iter().all(|down| *down) {
            return false;
        }
        unhealthy.iter_mut().for_each(|down| *down = false);
        info!(members = self.members.len(), "All cluster members were down, retrying every member");
        true
    }

    /// Probe every unhealthy member and revive those answering with 2xx.
    ///
    /// Returns how many members were revived. Does nothing when no
    /// health-check path is configured.
    pub async fn probe(&self, client: &reqwest::Client) -> usize {
        if self.health_check_path.is_empty() {
            return 0;
        }

        let candidates: Vec<String> = self
            .members
            .iter()
            .zip(self.unhealthy.read().iter())
            .filter(|(_, down)| **down)
            .map(|(member, _)| member.clone())
            .collect();

        let mut revived = 0;
        for member in candidates {
            let url = format!(
                "{}/{}",
                member,
                self.health_check_path.trim_start_matches('/')
            );
            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    self.mark_healthy(&member);
                    revived += 1;
                }
                Ok(response) => {
                    debug!(member = %member, status = %response.status(), "Health check rejected");
                }
                Err(e) => {
                    debug!(member = %member, error = %e, "Health check failed");
                }
            }
        }

        revived
    }

    /// Run [`probe`](Self::probe) every `interval` on a background task.
    ///
    /// The task holds a weak reference and stops once the cluster is dropped.
    /// Returns `None` when no health-check path is configured. Must be called
    /// from within a Tokio runtime.
    pub fn spawn_health_checker(
        self: &Arc<Self>,
        client: reqwest::Client,
        interval: Duration,
    ) -> Option<JoinHandle<()>> {
        if self.health_check_path.is_empty() {
            return None;
        }

        let interval = interval.max(Duration::from_millis(1));
        let cluster = Arc::downgrade(self);
        info!(
            interval = ?interval,
            path = %self.health_check_path,
            "Starting cluster health checker"
        );

        Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                let Some(cluster) = cluster.upgrade() else {
                    debug!("Cluster dropped, stopping health checker");
                    break;
                };
                let revived = cluster.probe(&client).await;
                if revived > 0 {
                    debug!(revived, "Health checker revived members");
                }
            }
        }))
    }

    fn index_of(&self, member: &str) -> Option<usize> {
        let member = member.trim().trim_end_matches('/');
        self.members.iter().position(|m| m == member)
    }

    fn healthy_indices(&self) -> Vec<usize> {
        self.unhealthy
            .read()
            .iter()
            .enumerate()
            .filter(|(_, down)| !**down)
            .map(|(index, _)| index)
            .collect()
    }
}

impl ClusterMembership for HttpCluster {
    fn select_member(&self) -> Result<String> {
        let healthy = self.healthy_indices();
        if healthy.is_empty() {
            return Err(ClusterError::NoHealthyMember {
                members: self.members.len(),
            });
        }

        let index = match self.strategy {
            SelectionStrategy::Sticky => healthy[0],
            SelectionStrategy::RoundRobin => {
                let turn = self.cursor.fetch_add(1, Ordering::Relaxed);
                healthy[turn % healthy.len()]
            }
            SelectionStrategy::Random => {
                use rand::Rng;
                healthy[rand::rng().random_range(0..healthy.len())]
            }
        };

        Ok(self.members[index].clone())
    }

    fn mark_unhealthy(&self, member: &str) {
        match self.index_of(member) {
            Some(index) => {
                let mut unhealthy = self.unhealthy.write();
                if !unhealthy[index] {
                    unhealthy[index] = true;
                    warn!(member = %self.members[index], "Cluster member marked unhealthy");
                }
            }
            None => {
                debug!(member = %member, "Ignoring unknown cluster member");
            }
        }
    }

    fn members(&self) -> Vec<String> {
        self.members.clone()
    }

    fn healthy_members(&self) -> Vec<String> {
        self.healthy_indices()
            .into_iter()
            .map(|index| self.members[index].clone())
            .collect()
    }
}

fn parse_member(endpoint: &str) -> Result<String> {
    let member = endpoint.trim().trim_end_matches('/');
    if member.is_empty() {
        return Err(ClusterError::InvalidEndpoint(
            "empty endpoint in list".to_string(),
        ));
    }

    let url = url::Url::parse(member)
        .map_err(|e| ClusterError::InvalidEndpoint(format!("{}: {}", member, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClusterError::InvalidEndpoint(format!(
            "{}: unsupported scheme '{}'",
            member,
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ClusterError::InvalidEndpoint(format!("{}: missing host", member)));
    }

    Ok(member.to_string())
}
