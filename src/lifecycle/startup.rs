//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every component from the validated configuration
//! - Verify record store credentials (diagnostic only)
//! - Load the initial pool before the first evaluation cycle
//!
//! # Design Decisions
//! - Collaborators are injected through [`Collaborators`] so tests can swap in fakes
//! - An unreachable record store at startup is not fatal: the pool starts
//!   empty and the refresher keeps trying

use std::sync::Arc;
use std::time::Duration;

use crate::alert::{AlertSink, LogSink, TelegramSink};
use crate::config::FailoverConfig;
use crate::failover::{FailoverController, PoolRefresher, RemovalGateway};
use crate::health::{HttpProbe, MachineProbe, PingProbe, ServiceProbe};
use crate::pool::PoolRegistry;
use crate::provider::{CloudflareStore, RecordStore};
use crate::resilience::Backoff;

/// External collaborators the engine depends on.
pub struct Collaborators {
    pub store: Arc<dyn RecordStore>,
    pub sink: Arc<dyn AlertSink>,
    pub service_probe: Arc<dyn ServiceProbe>,
    pub machine_probe: Arc<dyn MachineProbe>,
}

impl Collaborators {
    /// Production collaborators derived from configuration.
    pub fn from_config(config: &FailoverConfig) -> Self {
        let sink: Arc<dyn AlertSink> = if config.alert.enabled {
            Arc::new(TelegramSink::new(config.alert.clone()))
        } else {
            tracing::warn!("Alert channel disabled, alerts will only be logged");
            Arc::new(LogSink)
        };

        Self {
            store: Arc::new(CloudflareStore::new(config.dns.clone())),
            sink,
            service_probe: Arc::new(HttpProbe::new(&config.health_check)),
            machine_probe: Arc::new(PingProbe::new(&config.health_check)),
        }
    }
}

/// Fully wired engine, ready to be spawned.
pub struct Services {
    pub registry: Arc<PoolRegistry>,
    pub controller: FailoverController,
    pub refresher: PoolRefresher,
    store: Arc<dyn RecordStore>,
}

impl Services {
    pub fn assemble(config: &FailoverConfig, collaborators: Collaborators) -> Self {
        let registry = Arc::new(PoolRegistry::new(
            collaborators.store.clone(),
            config.dns.record_name.clone(),
            &config.health_check,
            &config.auxiliary_endpoints,
        ));

        let gateway = RemovalGateway::new(
            collaborators.store.clone(),
            collaborators.sink,
            registry.clone(),
        );

        let controller = FailoverController::new(
            registry.clone(),
            gateway,
            collaborators.service_probe,
            collaborators.machine_probe,
            config.failover.clone(),
        );

        let refresher = PoolRefresher::new(
            registry.clone(),
            Duration::from_secs(config.failover.refresh_interval_secs),
        );

        Self {
            registry,
            controller,
            refresher,
            store: collaborators.store,
        }
    }

    /// Verify credentials and load the initial pool.
    pub async fn initial_load(&self, attempts: u32, backoff: Backoff) {
        match self.store.verify_credentials().await {
            Ok(()) => tracing::info!("Record store credentials verified"),
            Err(e) => tracing::warn!(error = %e, "Record store credential check failed"),
        }

        if let Err(e) = self.registry.refresh_with_retry(attempts, backoff).await {
            tracing::error!(
                error = %e,
                attempts,
                "Initial pool load failed, starting with an empty pool"
            );
        }
    }
}
