//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build collaborators → Assemble engine → Initial pool load
//!
//! Run:
//!     Shutdown::spawn(controller), Shutdown::spawn(refresher), Shutdown::spawn(status server)
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → tasks finish current work → drain with grace period
//! ```
//!
//! # Design Decisions
//! - Only config loading and binding the status listener are fatal
//! - Shutdown has a deadline: stuck tasks are aborted after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Collaborators, Services};
