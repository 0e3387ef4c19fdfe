//! Pool snapshot management.
//!
//! # Responsibilities
//! - Resync the pool from the record store (full replace, never a merge)
//! - Hand out read-only snapshots to the evaluation cycle
//! - Drop individual servers after a successful removal
//!
//! # Design Decisions
//! - Snapshot lives in an `ArcSwap`: readers never see a half-replaced list
//! - A failed refresh keeps the previous snapshot untouched
//! - `remove` is idempotent and goes through `rcu` so it composes with refreshes

use std::collections::{HashMap, HashSet};
use std::net::Ipv6Addr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;
use url::Url;

use crate::config::HealthCheckConfig;
use crate::observability::metrics;
use crate::pool::server::Server;
use crate::provider::{DnsRecord, RecordStore, RecordStoreError};
use crate::resilience::Backoff;

/// Read-only view of the pool at one point in time.
pub type PoolSnapshot = Arc<Vec<Arc<Server>>>;

/// Errors from a pool refresh. The previous snapshot is always retained.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to list records: {0}")]
    Store(#[from] RecordStoreError),
}

/// Owner of the current pool snapshot.
pub struct PoolRegistry {
    store: Arc<dyn RecordStore>,
    record_name: String,
    scheme: String,
    port: Option<u16>,
    auxiliary_endpoints: HashMap<String, Url>,
    snapshot: ArcSwap<Vec<Arc<Server>>>,
}

impl PoolRegistry {
    /// Create an empty registry. Call [`PoolRegistry::refresh`] to populate it.
    pub fn new(
        store: Arc<dyn RecordStore>,
        record_name: impl Into<String>,
        health: &HealthCheckConfig,
        auxiliary_endpoints: &HashMap<String, String>,
    ) -> Self {
        let mut parsed = HashMap::new();
        for (identity, raw) in auxiliary_endpoints {
            match Url::parse(raw) {
                Ok(url) => {
                    parsed.insert(identity.clone(), url);
                }
                Err(e) => {
                    tracing::warn!(identity = %identity, url = %raw, error = %e, "Ignoring invalid auxiliary endpoint");
                }
            }
        }

        Self {
            store,
            record_name: record_name.into(),
            scheme: health.scheme.clone(),
            port: health.port,
            auxiliary_endpoints: parsed,
            snapshot: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Resync the snapshot from the record store.
    ///
    /// Every server in the new snapshot starts with zero failures, including
    /// identities that were already present.
    pub async fn refresh(&self) -> Result<PoolSnapshot, RefreshError> {
        tracing::info!(record = %self.record_name, "Refreshing server pool");

        let records = match self.store.list(&self.record_name).await {
            Ok(records) => records,
            Err(e) => {
                metrics::record_refresh(false);
                tracing::error!(
                    record = %self.record_name,
                    error = %e,
                    retained = self.len(),
                    "Pool refresh failed, keeping previous snapshot"
                );
                return Err(e.into());
            }
        };

        let servers = self.build_servers(records);
        let snapshot: PoolSnapshot = Arc::new(servers);
        let previous = self.snapshot.swap(snapshot.clone());
        for server in previous.iter() {
            metrics::clear_failures(&server.identity);
        }

        metrics::record_refresh(true);
        metrics::set_pool_size(snapshot.len());
        tracing::info!(
            record = %self.record_name,
            servers = snapshot.len(),
            identities = ?snapshot.iter().map(|s| s.identity.as_str()).collect::<Vec<_>>(),
            "Server pool updated"
        );
        Ok(snapshot)
    }

    /// Refresh, retrying failures with exponential backoff. Used for the initial load.
    pub async fn refresh_with_retry(
        &self,
        attempts: u32,
        backoff: Backoff,
    ) -> Result<PoolSnapshot, RefreshError> {
        let mut attempt = 1;
        loop {
            match self.refresh().await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) if attempt >= attempts => return Err(e),
                Err(_) => {
                    let delay = backoff.delay(attempt);
                    tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "Retrying pool refresh");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Current snapshot for one evaluation cycle.
    pub fn current_pool(&self) -> PoolSnapshot {
        self.snapshot.load_full()
    }

    /// Drop the server with `identity` from the snapshot.
    ///
    /// Returns true if a server was removed. Removing an absent identity is a no-op.
    pub fn remove(&self, identity: &str) -> bool {
        self.remove_where(identity, |s| s.identity == identity)
    }

    /// Drop exactly this snapshot entry.
    ///
    /// A refresh may have replaced the entry with a new one for the same
    /// identity (e.g. a reinstated record with a new handle); that newer
    /// entry is left alone.
    pub fn remove_entry(&self, server: &Server) -> bool {
        self.remove_where(&server.identity, |s| std::ptr::eq(Arc::as_ptr(s), server))
    }

    fn remove_where<F>(&self, identity: &str, matches: F) -> bool
    where
        F: Fn(&Arc<Server>) -> bool,
    {
        let mut removed = false;
        let previous = self.snapshot.rcu(|current| {
            let remaining: Vec<Arc<Server>> = current
                .iter()
                .filter(|s| !matches(*s))
                .cloned()
                .collect();
            removed = remaining.len() != current.len();
            remaining
        });

        if removed {
            let size = previous.len().saturating_sub(1);
            metrics::set_pool_size(size);
            metrics::clear_failures(identity);
            tracing::info!(identity = %identity, remaining = size, "Server dropped from pool snapshot");
        } else {
            tracing::debug!(identity = %identity, "Server not in pool, nothing to remove");
        }
        removed
    }

    /// Look up one server in the current snapshot.
    pub fn get(&self, identity: &str) -> Option<Arc<Server>> {
        self.snapshot
            .load()
            .iter()
            .find(|s| s.identity == identity)
            .cloned()
    }

    pub fn identities(&self) -> Vec<String> {
        self.snapshot.load().iter().map(|s| s.identity.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    fn build_servers(&self, records: Vec<DnsRecord>) -> Vec<Arc<Server>> {
        let mut seen = HashSet::new();
        let mut servers = Vec::with_capacity(records.len());

        for record in records {
            let identity = record.content.trim().to_string();
            if !seen.insert(identity.clone()) {
                tracing::warn!(identity = %identity, handle = %record.handle, "Duplicate record for identity, keeping first");
                continue;
            }

            let primary = match self.primary_endpoint(&identity) {
                Some(url) => url,
                None => {
                    tracing::warn!(identity = %identity, handle = %record.handle, "Record content is not a usable address, skipping");
                    continue;
                }
            };

            let auxiliary = self.auxiliary_endpoints.get(&identity).cloned();
            servers.push(Arc::new(Server::new(
                identity,
                record.name,
                record.handle,
                primary,
                auxiliary,
            )));
        }
        servers
    }

    fn primary_endpoint(&self, identity: &str) -> Option<Url> {
        if identity.is_empty() {
            return None;
        }
        let host = if identity.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", identity)
        } else {
            identity.to_string()
        };
        let raw = match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, host, port),
            None => format!("{}://{}", self.scheme, host),
        };
        let url = Url::parse(&raw).ok()?;
        // Reject contents that smuggle a path or credentials into the host part.
        if url.path() != "/" || url.host_str().is_none() || !url.username().is_empty() {
            return None;
        }
        Some(url)
    }
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("record_name", &self.record_name)
            .field("servers", &self.len())
            .finish()
    }
}
