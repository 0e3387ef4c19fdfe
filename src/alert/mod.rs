//! Operator alert channel.
//!
//! # Data Flow
//! ```text
//! FailoverController (threshold crossed)
//!     → message.rs (format HTML alert text)
//!     → RemovalGateway::notify
//!     → AlertSink::send (telegram.rs, or LogSink when alerting is disabled)
//! ```
//!
//! # Design Decisions
//! - Fire-and-forget: a failed send is logged by the caller, never retried
//! - Sinks enforce their own deadline

pub mod message;
pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

pub use message::OfflineAlert;
pub use telegram::TelegramSink;

/// Errors that can occur when delivering an alert.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("send timed out after {0} seconds")]
    Timeout(u64),

    /// Sink answered with a non-success status.
    #[error("alert rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Notification sink for operator alerts.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), AlertError>;
}

/// Sink used when no alert channel is configured: writes the alert to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn send(&self, text: &str) -> Result<(), AlertError> {
        tracing::warn!(alert = %text, "Alert channel disabled, logging alert");
        Ok(())
    }
}
