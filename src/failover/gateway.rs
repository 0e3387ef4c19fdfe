//! Alert and removal side effects.
//!
//! # Responsibilities
//! - Deliver operator alerts, best effort
//! - Delete a server's record at the provider
//! - Drop the server from the local snapshot only after the deletion succeeded
//!
//! Neither operation propagates errors: failures are logged and reported
//! back as plain outcomes so the cycle keeps going.

use std::sync::Arc;

use crate::alert::AlertSink;
use crate::observability::metrics;
use crate::pool::{PoolRegistry, Server};
use crate::provider::RecordStore;

/// Result of a removal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Record deleted and server dropped from the snapshot.
    Removed,
    /// Provider rejected or could not be reached. Snapshot unchanged.
    Failed,
}

/// Translates controller decisions into external side effects.
pub struct RemovalGateway {
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn AlertSink>,
    registry: Arc<PoolRegistry>,
}

impl RemovalGateway {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sink: Arc<dyn AlertSink>,
        registry: Arc<PoolRegistry>,
    ) -> Self {
        Self {
            store,
            sink,
            registry,
        }
    }

    /// Send an alert. Returns whether the sink accepted it.
    pub async fn notify(&self, message: &str) -> bool {
        match self.sink.send(message).await {
            Ok(()) => {
                metrics::record_alert(true);
                tracing::info!("Alert delivered");
                true
            }
            Err(e) => {
                metrics::record_alert(false);
                tracing::error!(error = %e, "Failed to deliver alert");
                false
            }
        }
    }

    /// Delete the server's record and, on success, drop it from the pool.
    pub async fn remove(&self, server: &Server) -> RemovalOutcome {
        tracing::warn!(
            identity = %server.identity,
            handle = %server.record_handle,
            "Removing server from DNS pool"
        );

        match self.store.delete(&server.record_handle).await {
            Ok(()) => {
                metrics::record_removal(true);
                self.registry.remove_entry(server);
                tracing::info!(identity = %server.identity, "Server record deleted");
                RemovalOutcome::Removed
            }
            Err(e) => {
                metrics::record_removal(false);
                tracing::error!(
                    identity = %server.identity,
                    handle = %server.record_handle,
                    error = %e,
                    "Failed to delete server record, will retry next cycle"
                );
                RemovalOutcome::Failed
            }
        }
    }
}
