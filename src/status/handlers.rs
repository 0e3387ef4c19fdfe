use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::status::StatusState;

pub const LIVENESS_MESSAGE: &str = "dns-failover is running. See logs for status.";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub record_name: String,
    pub pool_size: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerStatus {
    pub identity: String,
    pub record_name: String,
    pub record_handle: String,
    pub auxiliary_endpoint: Option<String>,
    pub consecutive_failures: u32,
    pub alerted: bool,
}

pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

pub async fn get_status(State(state): State<StatusState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        record_name: state.registry.record_name().to_string(),
        pool_size: state.registry.len(),
    })
}

pub async fn get_pool(State(state): State<StatusState>) -> Json<Vec<ServerStatus>> {
    let pool = state.registry.current_pool();
    let statuses = pool
        .iter()
        .map(|s| ServerStatus {
            identity: s.identity.clone(),
            record_name: s.record_name.clone(),
            record_handle: s.record_handle.to_string(),
            auxiliary_endpoint: s.auxiliary_endpoint.as_ref().map(|u| u.to_string()),
            consecutive_failures: s.failures(),
            alerted: s.is_alerted(),
        })
        .collect();
    Json(statuses)
}
