//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the failover
//! controller. All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the DNS failover controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverConfig {
    /// Authoritative DNS record store (list/delete).
    pub dns: DnsConfig,

    /// Operator alert channel.
    pub alert: AlertConfig,

    /// Threshold and scheduling of the evaluation cycle.
    pub failover: PolicyConfig,

    /// Health probe settings.
    pub health_check: HealthCheckConfig,

    /// Optional identity -> auxiliary health endpoint mapping.
    pub auxiliary_endpoints: HashMap<String, String>,

    /// Liveness/status HTTP surface.
    pub status: StatusConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// DNS record store configuration (Cloudflare API).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DnsConfig {
    /// API base URL, without trailing slash.
    pub api_base: String,

    /// Bearer token used for every API call.
    pub api_token: String,

    /// Zone holding the pool records.
    pub zone_id: String,

    /// Name of the A-records forming the pool (e.g. "pool.example.com").
    pub record_name: String,

    /// Timeout for a single API call in seconds.
    pub timeout_secs: u64,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudflare.com/client/v4".to_string(),
            api_token: String::new(),
            zone_id: String::new(),
            record_name: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Alert channel configuration (Telegram bot).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Send alerts to Telegram. When disabled, alerts are only logged.
    pub enabled: bool,

    /// Bot API base URL, without trailing slash.
    pub api_base: String,

    pub bot_token: String,

    pub chat_id: String,

    /// Timeout for a single send in seconds.
    pub timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Failover policy and scheduling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Consecutive unhealthy evaluations before a server is removed.
    pub failure_threshold: u32,

    /// Evaluation cycle interval in seconds.
    pub check_interval_secs: u64,

    /// Pool refresh interval in seconds.
    pub refresh_interval_secs: u64,

    /// Attempts for the initial pool load at startup.
    pub startup_refresh_attempts: u32,

    /// Re-send the alert on every cycle while removal keeps failing.
    /// Set to false to alert once per failure streak.
    pub realert_on_failed_removal: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            check_interval_secs: 60,
            refresh_interval_secs: 3600,
            startup_refresh_attempts: 3,
            realert_on_failed_removal: true,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Scheme of the primary endpoint ("http" or "https").
    pub scheme: String,

    /// Port of the primary endpoint. Scheme default when absent.
    pub port: Option<u16>,

    /// Path to probe for HTTP health checks.
    pub path: String,

    /// Status code that signals a healthy service.
    pub expected_status: u16,

    /// Health check timeout in seconds.
    pub timeout_secs: u64,

    /// Echo requests sent by the reachability probe.
    pub ping_count: u32,

    /// Reachability probe timeout in seconds.
    pub ping_timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            port: None,
            path: "/ping".to_string(),
            expected_status: 200,
            timeout_secs: 5,
            ping_count: 2,
            ping_timeout_secs: 5,
        }
    }
}

/// Status surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Bearer token guarding `/status` and `/pool`. Open when unset.
    pub api_key: Option<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:3000".to_string(),
            api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
