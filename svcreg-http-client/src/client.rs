//! Cluster-aware client with bounded failover.

use std::sync::Arc;
use svcreg_cluster::ClusterMembership;
use tracing::{debug, warn};

use crate::{
    CallOutcome, CallRequest, HttpClientConfig, HttpClientError, HttpExecutor, ReqwestExecutor,
    Result,
};

/// Executes calls against whichever cluster member is currently healthy.
#[derive(Clone)]
pub struct ClusterClient {
    membership: Arc<dyn ClusterMembership>,
    executor: Arc<dyn HttpExecutor>,
    config: Arc<HttpClientConfig>,
}

impl ClusterClient {
    /// Create a client that sends requests with `reqwest`.
    pub fn new(membership: Arc<dyn ClusterMembership>, config: HttpClientConfig) -> Result<Self> {
        let executor = ReqwestExecutor::new(&config)?;
        Ok(Self::with_executor(membership, Arc::new(executor), config))
    }

    /// Create a client around a custom executor.
    pub fn with_executor(
        membership: Arc<dyn ClusterMembership>,
        executor: Arc<dyn HttpExecutor>,
        config: HttpClientConfig,
    ) -> Self {
        Self {
            membership,
            executor,
            config: Arc::new(config),
        }
    }

    /// Get the membership provider.
    pub fn membership(&self) -> &Arc<dyn ClusterMembership> {
        &self.membership
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Execute one logical call.
    ///
    /// A member that yields no HTTP response is marked unhealthy and the call
    /// moves to another member, up to the configured attempt limit. Any
    /// response with a status is returned as is, whatever the status.
    pub async fn call(&self, request: CallRequest) -> Result<CallOutcome> {
        match self.config.call_deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.call_with_failover(&request))
                .await
                .map_err(|_| {
                    warn!(
                        method = %request.method(),
                        path = %request.path(),
                        deadline = ?deadline,
                        "Call deadline elapsed"
                    );
                    HttpClientError::Timeout(deadline)
                })?,
            None => self.call_with_failover(&request).await,
        }
    }

    async fn call_with_failover(&self, request: &CallRequest) -> Result<CallOutcome> {
        let limit = self
            .config
            .failover
            .attempt_limit(self.membership.members().len());
        let mut attempt = 0;
        let mut last_error: Option<HttpClientError> = None;

        while attempt < limit {
            let member = match self.membership.select_member() {
                Ok(member) => member,
                Err(e) => {
                    debug!(attempts = attempt, error = %e, "No cluster member available");
                    return Err(HttpClientError::ClusterUnavailable {
                        attempts: attempt,
                        message: last_error
                            .map(|last| last.to_string())
                            .unwrap_or_else(|| e.to_string()),
                    });
                }
            };

            attempt += 1;
            let url = request.url_for(&member);
            debug!(
                method = %request.method(),
                url = %url,
                attempt,
                "Sending request"
            );

            match self
                .executor
                .execute(request.method().clone(), &url, request.body_bytes().cloned())
                .await
            {
                Ok(outcome) => {
                    debug!(
                        method = %request.method(),
                        url = %url,
                        status = %outcome.status(),
                        "Received response"
                    );
                    return Ok(outcome.with_member(member));
                }
                Err(e) if e.is_failover() => {
                    warn!(
                        member = %member,
                        attempt,
                        error = %e,
                        "Member did not respond, failing over"
                    );
                    self.membership.mark_unhealthy(&member);
                    last_error = Some(e);

                    if attempt < limit {
                        let delay = self.config.failover.delay_for_attempt(attempt - 1);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(HttpClientError::ClusterUnavailable {
            attempts: attempt,
            message: last_error
                .map(|last| last.to_string())
                .unwrap_or_else(|| "attempt limit reached".to_string()),
        })
    }
}
