//! Failover evaluation cycle.
//!
//! # Per-server state machine
//! ```text
//! HEALTHY (failures = 0)
//!     → UNHEALTHY_1 .. UNHEALTHY_(N-1)   one step per unhealthy cycle
//!     → REMOVED                          failures >= threshold, same cycle
//! any UNHEALTHY_k → HEALTHY              on a fully healthy cycle
//! ```
//!
//! REMOVED is terminal for a snapshot entry: the server can only come back
//! as a fresh HEALTHY entry through the next pool refresh.
//!
//! Servers are evaluated sequentially in snapshot order, and a cycle always
//! runs to completion (including removals) before the next one starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::alert::OfflineAlert;
use crate::config::PolicyConfig;
use crate::failover::gateway::{RemovalGateway, RemovalOutcome};
use crate::health::{FailureTracker, MachineProbe, Outcome, ProbeKind, ServiceProbe};
use crate::observability::metrics;
use crate::pool::{PoolRegistry, Server};

/// What one evaluation cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Pool was empty; no probes ran.
    Skipped,
    Completed(CycleSummary),
}

/// Per-cycle counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub evaluated: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    pub alerts_sent: usize,
    pub removed: usize,
    pub removal_failures: usize,
}

/// Drives health evaluation of the pool on a fixed interval.
pub struct FailoverController {
    registry: Arc<PoolRegistry>,
    gateway: RemovalGateway,
    service_probe: Arc<dyn ServiceProbe>,
    machine_probe: Arc<dyn MachineProbe>,
    policy: PolicyConfig,
}

impl FailoverController {
    pub fn new(
        registry: Arc<PoolRegistry>,
        gateway: RemovalGateway,
        service_probe: Arc<dyn ServiceProbe>,
        machine_probe: Arc<dyn MachineProbe>,
        policy: PolicyConfig,
    ) -> Self {
        Self {
            registry,
            gateway,
            service_probe,
            machine_probe,
            policy,
        }
    }

    /// Run cycles every `check_interval_secs` until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.policy.check_interval_secs,
            threshold = self.policy.failure_threshold,
            "Failover controller starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.policy.check_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Failover controller received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Evaluate every server in the current snapshot once.
    pub async fn run_cycle(&self) -> CycleReport {
        let pool = self.registry.current_pool();
        if pool.is_empty() {
            tracing::warn!("No servers in pool, skipping health check cycle");
            return CycleReport::Skipped;
        }

        tracing::info!(servers = pool.len(), "Starting health check cycle");
        for server in pool.iter() {
            tracing::debug!(identity = %server.identity, failures = server.failures(), "Monitored server");
        }

        let mut summary = CycleSummary::default();
        for server in pool.iter() {
            self.evaluate_server(server, &mut summary).await;
        }

        tracing::info!(
            evaluated = summary.evaluated,
            healthy = summary.healthy,
            unhealthy = summary.unhealthy,
            removed = summary.removed,
            removal_failures = summary.removal_failures,
            "Health check cycle complete"
        );
        CycleReport::Completed(summary)
    }

    async fn evaluate_server(&self, server: &Server, summary: &mut CycleSummary) {
        summary.evaluated += 1;

        let service_healthy = self.service_probe.check_service(&server.primary_endpoint).await;
        metrics::record_probe(ProbeKind::Service, service_healthy);

        let auxiliary_healthy = match &server.auxiliary_endpoint {
            Some(endpoint) => {
                let healthy = self.service_probe.check_service(endpoint).await;
                metrics::record_probe(ProbeKind::Auxiliary, healthy);
                Some(healthy)
            }
            None => None,
        };

        let outcome = FailureTracker::evaluate(server, service_healthy, auxiliary_healthy);
        metrics::record_failures(&server.identity, outcome.failures());

        match outcome {
            Outcome::Healthy { previous_failures } => {
                summary.healthy += 1;
                server.clear_alerted();
                if previous_failures > 0 {
                    tracing::info!(identity = %server.identity, previous_failures, "Server recovered");
                } else {
                    tracing::debug!(identity = %server.identity, "Server healthy");
                }
            }
            Outcome::Unhealthy {
                failures,
                failed_probes,
            } => {
                summary.unhealthy += 1;

                let reachable = self.machine_probe.check_machine(&server.identity).await;
                metrics::record_probe(ProbeKind::Machine, reachable);

                tracing::warn!(
                    identity = %server.identity,
                    failures,
                    threshold = self.policy.failure_threshold,
                    failed = ?failed_probes.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                    reachable,
                    "Server unhealthy"
                );

                if failures >= self.policy.failure_threshold {
                    self.fail_over(server, failed_probes, reachable, failures, summary)
                        .await;
                }
            }
        }
    }

    async fn fail_over(
        &self,
        server: &Server,
        failed_probes: Vec<ProbeKind>,
        reachable: bool,
        failures: u32,
        summary: &mut CycleSummary,
    ) {
        tracing::warn!(
            identity = %server.identity,
            failures,
            threshold = self.policy.failure_threshold,
            "Failure threshold reached"
        );

        let first_alert = server.mark_alerted();
        if first_alert || self.policy.realert_on_failed_removal {
            let alert = OfflineAlert {
                identity: server.identity.clone(),
                record_name: server.record_name.clone(),
                failed_probes,
                reachable,
                failures,
            };
            if self.gateway.notify(&alert.render()).await {
                summary.alerts_sent += 1;
            }
        } else {
            tracing::info!(identity = %server.identity, "Alert already sent for this failure streak, retrying removal only");
        }

        match self.gateway.remove(server).await {
            RemovalOutcome::Removed => summary.removed += 1,
            RemovalOutcome::Failed => summary.removal_failures += 1,
        }
    }
}
