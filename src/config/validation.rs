//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold >= 1, intervals and timeouts > 0)
//! - Check required identifiers and credentials are present
//! - Check endpoints and bind addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::FailoverConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("health_check.scheme must be http or https, got '{0}'")]
    Scheme(String),

    #[error("auxiliary endpoint for '{identity}' is not a valid URL: {url}")]
    AuxiliaryEndpoint { identity: String, url: String },

    #[error("{field} is not a valid socket address: {value}")]
    Address { field: &'static str, value: String },
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("dns.api_base", &config.dns.api_base),
        ("dns.api_token", &config.dns.api_token),
        ("dns.zone_id", &config.dns.zone_id),
        ("dns.record_name", &config.dns.record_name),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Missing(field));
        }
    }

    if config.alert.enabled {
        if config.alert.bot_token.trim().is_empty() {
            errors.push(ValidationError::Missing("alert.bot_token"));
        }
        if config.alert.chat_id.trim().is_empty() {
            errors.push(ValidationError::Missing("alert.chat_id"));
        }
    }

    let positive = [
        ("failover.failure_threshold", u64::from(config.failover.failure_threshold)),
        ("failover.check_interval_secs", config.failover.check_interval_secs),
        ("failover.refresh_interval_secs", config.failover.refresh_interval_secs),
        ("failover.startup_refresh_attempts", u64::from(config.failover.startup_refresh_attempts)),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("health_check.ping_count", u64::from(config.health_check.ping_count)),
        ("health_check.ping_timeout_secs", config.health_check.ping_timeout_secs),
        ("dns.timeout_secs", config.dns.timeout_secs),
        ("alert.timeout_secs", config.alert.timeout_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    let scheme = config.health_check.scheme.as_str();
    if scheme != "http" && scheme != "https" {
        errors.push(ValidationError::Scheme(scheme.to_string()));
    }

    let mut identities: Vec<_> = config.auxiliary_endpoints.keys().collect();
    identities.sort();
    for identity in identities {
        let url = &config.auxiliary_endpoints[identity];
        if Url::parse(url).is_err() {
            errors.push(ValidationError::AuxiliaryEndpoint {
                identity: identity.clone(),
                url: url.clone(),
            });
        }
    }

    if config.status.enabled && config.status.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "status.bind_address",
            value: config.status.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
