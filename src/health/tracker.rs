//! Consecutive-failure tracking.
//!
//! # State Transitions
//! ```text
//! service healthy AND (auxiliary healthy OR no auxiliary endpoint) → Healthy, failures = 0
//! anything else                                                     → Unhealthy, failures += 1
//! ```
//!
//! The tracker never decides removal. It reports the updated count and the
//! controller compares it against the configured threshold.

use crate::health::probe::ProbeKind;
use crate::pool::Server;

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// All configured probes passed. `previous_failures` is the streak that was cleared.
    Healthy { previous_failures: u32 },
    /// At least one configured probe failed.
    Unhealthy {
        failures: u32,
        failed_probes: Vec<ProbeKind>,
    },
}

impl Outcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Outcome::Healthy { .. })
    }

    /// Failure count after this evaluation.
    pub fn failures(&self) -> u32 {
        match self {
            Outcome::Healthy { .. } => 0,
            Outcome::Unhealthy { failures, .. } => *failures,
        }
    }
}

/// Stateless transition logic over a server's failure counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailureTracker;

impl FailureTracker {
    /// Apply one round of probe results to `server`.
    ///
    /// `auxiliary_healthy` is `None` when the server has no auxiliary endpoint;
    /// absence never counts as a failure.
    pub fn evaluate(server: &Server, service_healthy: bool, auxiliary_healthy: Option<bool>) -> Outcome {
        let mut failed_probes = Vec::new();
        if !service_healthy {
            failed_probes.push(ProbeKind::Service);
        }
        if auxiliary_healthy == Some(false) {
            failed_probes.push(ProbeKind::Auxiliary);
        }

        if failed_probes.is_empty() {
            Outcome::Healthy {
                previous_failures: server.reset_failures(),
            }
        } else {
            Outcome::Unhealthy {
                failures: server.record_failure(),
                failed_probes,
            }
        }
    }
}
