//! Pool member abstraction.
//!
//! # Responsibilities
//! - Represent a single server registered as an A-record
//! - Carry the record handle needed to delete it at the provider
//! - Track consecutive failures (mutated only by the failure tracker)

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use url::Url;

use crate::provider::RecordHandle;

/// A single pool member.
#[derive(Debug)]
pub struct Server {
    /// Stable key (IP address or hostname), unique within a snapshot.
    pub identity: String,
    /// DNS record name this server is registered under.
    pub record_name: String,
    /// Provider reference used for deletion.
    pub record_handle: RecordHandle,
    /// Base URL probed by the service check.
    pub primary_endpoint: Url,
    /// Optional secondary health target from static configuration.
    pub auxiliary_endpoint: Option<Url>,

    consecutive_failures: AtomicU32,
    alerted: AtomicBool,
}

impl Server {
    pub fn new(
        identity: impl Into<String>,
        record_name: impl Into<String>,
        record_handle: RecordHandle,
        primary_endpoint: Url,
        auxiliary_endpoint: Option<Url>,
    ) -> Self {
        Self {
            identity: identity.into(),
            record_name: record_name.into(),
            record_handle,
            primary_endpoint,
            auxiliary_endpoint,
            consecutive_failures: AtomicU32::new(0),
            alerted: AtomicBool::new(false),
        }
    }

    /// Current consecutive failure count.
    pub fn failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    /// Reset the failure count, returning the previous value.
    pub(crate) fn reset_failures(&self) -> u32 {
        self.consecutive_failures.swap(0, Ordering::AcqRel)
    }

    /// Add one failure, returning the new count.
    pub(crate) fn record_failure(&self) -> u32 {
        self.consecutive_failures
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1)
    }

    /// Whether an alert was already sent for the current failure streak.
    pub fn is_alerted(&self) -> bool {
        self.alerted.load(Ordering::Acquire)
    }

    /// Mark the current streak as alerted. Returns true if it was not already.
    pub(crate) fn mark_alerted(&self) -> bool {
        !self.alerted.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn clear_alerted(&self) {
        self.alerted.store(false, Ordering::Release);
    }
}
