//! DNS pool health-failover controller library.

pub mod alert;
pub mod config;
pub mod failover;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod provider;
pub mod resilience;
pub mod status;

pub use config::FailoverConfig;
pub use failover::FailoverController;
pub use lifecycle::Shutdown;
pub use pool::PoolRegistry;
