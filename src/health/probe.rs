//! Service-level health probing.
//!
//! # Responsibilities
//! - Issue a bounded-timeout GET to the health path of an endpoint
//! - Map every transport failure, timeout or unexpected status to `false`
//!
//! Probes are stateless and safe to call concurrently for different servers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time;
use url::Url;

use crate::config::HealthCheckConfig;

/// Which probe produced a result. Used in logs, metrics and alert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// HTTP probe against the server's primary endpoint.
    Service,
    /// HTTP probe against the configured auxiliary endpoint.
    Auxiliary,
    /// Machine reachability (echo) probe.
    Machine,
}

impl ProbeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::Service => "service",
            ProbeKind::Auxiliary => "auxiliary",
            ProbeKind::Machine => "machine",
        }
    }
}

/// Service health check against one endpoint.
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    /// Returns true iff the endpoint answered its health path with the expected status.
    async fn check_service(&self, endpoint: &Url) -> bool;
}

/// Low-level machine reachability check.
#[async_trait]
pub trait MachineProbe: Send + Sync {
    async fn check_machine(&self, identity: &str) -> bool;
}

/// HTTP implementation of [`ServiceProbe`].
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    path: String,
    expected_status: u16,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(config: &HealthCheckConfig) -> Self {
        Self {
            client: Client::new(),
            path: config.path.clone(),
            expected_status: config.expected_status,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn target(&self, endpoint: &Url) -> String {
        let base = endpoint.as_str().trim_end_matches('/');
        if self.path.starts_with('/') {
            format!("{}{}", base, self.path)
        } else {
            format!("{}/{}", base, self.path)
        }
    }
}

#[async_trait]
impl ServiceProbe for HttpProbe {
    async fn check_service(&self, endpoint: &Url) -> bool {
        let target = self.target(endpoint);
        let response_future = self
            .client
            .get(&target)
            .header("user-agent", "dns-failover-health-check")
            .send();

        match time::timeout(self.timeout, response_future).await {
            Ok(Ok(response)) => {
                let success = response.status().as_u16() == self.expected_status;
                if !success {
                    tracing::warn!(target = %target, status = %response.status(), "Health check failed: unexpected status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(target = %target, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(target = %target, "Health check failed: timeout");
                false
            }
        }
    }
}
