//! Record store types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque provider reference needed to delete one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordHandle(pub String);

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One A-record as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Record name (shared by every member of the pool).
    pub name: String,
    /// Record content: the server address.
    pub content: String,
    pub handle: RecordHandle,
}

/// Errors that can occur while talking to the record store.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// Connection or request failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request did not complete within the deadline.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Provider answered with `success: false` or an error status.
    #[error("provider rejected request: {0}")]
    Api(String),
}

/// Result type for record store operations.
pub type RecordStoreResult<T> = Result<T, RecordStoreError>;
