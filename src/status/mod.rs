//! Liveness and status HTTP surface.
//!
//! # Routes
//! - `GET /`       static liveness string, always open
//! - `GET /status` version and pool size
//! - `GET /pool`   per-server failure state
//!
//! `/status` and `/pool` sit behind bearer auth when `status.api_key` is set.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::pool::PoolRegistry;
use self::auth::require_api_key;
use self::handlers::{get_pool, get_status, liveness};

/// State injected into status handlers.
#[derive(Clone)]
pub struct StatusState {
    pub registry: Arc<PoolRegistry>,
    pub api_key: Option<Arc<str>>,
}

impl StatusState {
    pub fn new(registry: Arc<PoolRegistry>, api_key: Option<String>) -> Self {
        Self {
            registry,
            api_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
        }
    }
}

/// Build the status router.
#[allow(deprecated)]
pub fn router(state: StatusState) -> Router {
    let protected = Router::new()
        .route("/status", get(get_status))
        .route("/pool", get(get_pool))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/", get(liveness))
        .merge(protected)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(TraceLayer::new_for_http())
}

/// Serve the status surface until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    state: StatusState,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Status server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Status server stopped");
    Ok(())
}
