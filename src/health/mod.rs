//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Evaluation cycle, per server:
//!     → probe.rs   service probe on primary endpoint (+ auxiliary endpoint if configured)
//!     → tracker.rs update consecutive failures → Outcome
//!     → ping.rs    reachability probe, only when Unhealthy (diagnostic context)
//! ```
//!
//! # Design Decisions
//! - Probes never return errors: every failure mode maps to `false`
//! - Reachability never gates removal, it only enriches the alert
//! - Failure state is per-server, stored on the pool snapshot entry

pub mod ping;
pub mod probe;
pub mod tracker;

pub use ping::PingProbe;
pub use probe::{HttpProbe, MachineProbe, ProbeKind, ServiceProbe};
pub use tracker::{FailureTracker, Outcome};
