//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Initial pool load fails:
//!     → backoff.rs (exponential delay + jitter)
//!     → PoolRegistry::refresh_with_retry tries again
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call carries its own deadline
//!   (probes, record store, alert sink enforce theirs locally)
//! - Only the startup refresh retries; alerts and removals never retry within a cycle

pub mod backoff;

pub use backoff::Backoff;
