//! Client configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use svcreg_cluster::SelectionStrategy;
use svcreg_http_client::{FailoverConfig, HttpClientConfig};
use svcreg_log::LogOutput;
use tracing::warn;

/// Registry address used when none is configured.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";

/// How often downed members are probed when a health-check path is set.
pub const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Registry client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Comma-separated list of cluster member base URLs.
    pub url: String,
    /// Path probed to bring unhealthy members back. Empty disables probing.
    pub health_check_path: String,
    /// Time between health probes of downed members.
    pub health_check_interval: Duration,
    /// How a member is picked for each attempt.
    pub strategy: SelectionStrategy,
    /// Transport settings: timeouts, failover bounds, pooling.
    pub http: HttpClientConfig,
    /// Where this client's log events go.
    pub log: LogOutput,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            health_check_path: String::new(),
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
            strategy: SelectionStrategy::default(),
            http: HttpClientConfig::default(),
            log: LogOutput::default(),
        }
    }
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Read the configuration from `SVCREG_*` environment variables.
    ///
    /// - `SVCREG_URL`
    /// - `SVCREG_HEALTH_CHECK_PATH`
    /// - `SVCREG_HEALTH_CHECK_INTERVAL_SECS`
    /// - `SVCREG_TIMEOUT_SECS`
    /// - `SVCREG_MAX_ATTEMPTS`
    /// - `SVCREG_CALL_DEADLINE_SECS`
    ///
    /// Unset variables keep their default. Unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SVCREG_URL").filter(|v| !v.trim().is_empty()) {
            config.url = url;
        }
        if let Some(path) = lookup("SVCREG_HEALTH_CHECK_PATH") {
            config.health_check_path = path;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SVCREG_HEALTH_CHECK_INTERVAL_SECS") {
            config.health_check_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SVCREG_TIMEOUT_SECS") {
            config.http.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_var::<u32, _>(&lookup, "SVCREG_MAX_ATTEMPTS") {
            config.http.failover.max_attempts = Some(attempts);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SVCREG_CALL_DEADLINE_SECS") {
            config.http.call_deadline = Some(Duration::from_secs(secs));
        }

        config
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the cluster member list.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the health-check path.
    pub fn health_check_path(mut self, path: impl Into<String>) -> Self {
        self.config.health_check_path = path.into();
        self
    }

    /// Set the time between health probes.
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.config.health_check_interval = interval;
        self
    }

    /// Set the member selection strategy.
    pub fn strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = timeout;
        self
    }

    /// Set a deadline for whole calls, across failover attempts.
    pub fn call_deadline(mut self, deadline: Duration) -> Self {
        self.config.http.call_deadline = Some(deadline);
        self
    }

    /// Cap the number of attempts per call.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.http.failover.max_attempts = Some(max_attempts);
        self
    }

    /// Set the failover configuration.
    pub fn failover(mut self, failover: FailoverConfig) -> Self {
        self.config.http.failover = failover;
        self
    }

    /// Replace the transport configuration wholesale.
    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Set the log output.
    pub fn log(mut self, log: LogOutput) -> Self {
        self.config.log = log;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}
