//! Authoritative DNS record store.
//!
//! # Data Flow
//! ```text
//! PoolRegistry::refresh
//!     → RecordStore::list(record_name)
//!     → Vec<DnsRecord> mapped into Servers
//!
//! RemovalGateway::remove
//!     → RecordStore::delete(record handle)
//! ```
//!
//! # Design Decisions
//! - The store is a trait object so the controller runs against fakes in tests
//! - Implementations enforce their own request deadline
//! - Errors are typed; callers decide whether to log, retain or retry

pub mod cloudflare;
pub mod types;

use async_trait::async_trait;

pub use cloudflare::CloudflareStore;
pub use types::{DnsRecord, RecordHandle, RecordStoreError, RecordStoreResult};

/// Remote mapping store holding the pool's A-records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List every A-record registered under `record_name`.
    async fn list(&self, record_name: &str) -> RecordStoreResult<Vec<DnsRecord>>;

    /// Delete the record identified by `handle`.
    async fn delete(&self, handle: &RecordHandle) -> RecordStoreResult<()>;

    /// Check that the configured credentials are accepted.
    async fn verify_credentials(&self) -> RecordStoreResult<()> {
        Ok(())
    }
}
