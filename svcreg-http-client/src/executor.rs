//! HTTP execution capability.

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use std::time::Duration;
use tracing::trace;

use crate::{CallOutcome, HttpClientConfig, HttpClientError, Result};

const APPLICATION_JSON: &str = "application/json";

/// Sends a single HTTP request to a fully resolved URL.
///
/// Implementations report a missing HTTP response as
/// [`HttpClientError::Connection`]; every response that carries a status,
/// whatever the status, is returned as a [`CallOutcome`] with its body
/// buffered.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Execute one request.
    async fn execute(&self, method: Method, url: &str, body: Option<Bytes>) -> Result<CallOutcome>;
}

/// [`HttpExecutor`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    inner: reqwest::Client,
    timeout: Duration,
}

impl ReqwestExecutor {
    /// Build the underlying client from `config`.
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .brotli(config.brotli);

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;

        Ok(Self {
            inner,
            timeout: config.timeout,
        })
    }

    /// Get the underlying reqwest client, shared with cluster health probes.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, method: Method, url: &str, body: Option<Bytes>) -> Result<CallOutcome> {
        let mut request = self
            .inner
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
            .header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        if let Some(body) = body {
            request = request.body(body);
        }

        let request = request
            .build()
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;

        let response = self.inner.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                HttpClientError::Connection(format!("no response within {:?}", self.timeout))
            } else {
                HttpClientError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        let body = if response.content_length() == Some(0) {
            Bytes::new()
        } else {
            response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    HttpClientError::Timeout(self.timeout)
                } else {
                    HttpClientError::Body(e.to_string())
                }
            })?
        };

        trace!(status = %status, bytes = body.len(), "Buffered response body");
        Ok(CallOutcome::new(status, body))
    }
}
