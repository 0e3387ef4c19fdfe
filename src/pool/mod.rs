//! Server pool subsystem.
//!
//! # Data Flow
//! ```text
//! Refresh timer
//!     → registry.rs (RecordStore::list → build Servers → atomic swap)
//!
//! Evaluation cycle
//!     → registry.rs current_pool() (read-only snapshot)
//!     → server.rs failure counters updated in place
//!     → registry.rs remove(identity) after a successful record deletion
//! ```
//!
//! # Design Decisions
//! - The registry is the only owner of the snapshot
//! - Refresh is a full resync: counters start at zero for every server
//! - Identity is the lookup key everywhere

pub mod registry;
pub mod server;

pub use registry::{PoolRegistry, PoolSnapshot, RefreshError};
pub use server::Server;
