//! Failover decision engine.
//!
//! # Data Flow
//! ```text
//! controller.rs (every check interval)
//!     → PoolRegistry::current_pool()
//!     → per server: probes → FailureTracker → Outcome
//!     → failures >= threshold:
//!           gateway.rs notify (alert sink)
//!           gateway.rs remove (record store delete → PoolRegistry::remove)
//!
//! refresher.rs (every refresh interval)
//!     → PoolRegistry::refresh()
//! ```
//!
//! # Design Decisions
//! - Threshold comparison lives here, not in the tracker
//! - No error from one server interrupts the rest of the cycle
//! - Reachability is diagnostic only and never suppresses removal
//! - One alert per failure streak unless re-alerting is configured

pub mod controller;
pub mod gateway;
pub mod refresher;

pub use controller::{CycleReport, CycleSummary, FailoverController};
pub use gateway::{RemovalGateway, RemovalOutcome};
pub use refresher::PoolRefresher;
