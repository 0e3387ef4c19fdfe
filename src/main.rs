//! DNS pool health-failover controller.
//!
//! # Architecture Overview
//!
//! ```text
//! refresher (hourly)    record store ──list──▶ pool registry
//! controller (minutely) pool registry ──▶ probes ──▶ failure tracker
//!                       threshold hit ──▶ alert sink + record store delete
//!                                     ──▶ pool registry remove
//! status server         pool registry ──▶ GET /, /status, /pool
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use dns_failover::config::load_config;
use dns_failover::lifecycle::signals::wait_for_shutdown_signal;
use dns_failover::lifecycle::{Collaborators, Services, Shutdown};
use dns_failover::observability::{logging, metrics};
use dns_failover::resilience::Backoff;
use dns_failover::status::{self, StatusState};

#[derive(Parser)]
#[command(name = "dns-failover")]
#[command(about = "Removes unhealthy servers from a DNS A-record pool", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "dns-failover.toml")]
    config: PathBuf,

    /// Seconds to wait for tasks to stop on shutdown.
    #[arg(long, default_value_t = 30)]
    grace_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!("dns-failover v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        record = %config.dns.record_name,
        threshold = config.failover.failure_threshold,
        check_interval_secs = config.failover.check_interval_secs,
        refresh_interval_secs = config.failover.refresh_interval_secs,
        auxiliary_endpoints = config.auxiliary_endpoints.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let services = Services::assemble(&config, Collaborators::from_config(&config));
    services
        .initial_load(config.failover.startup_refresh_attempts, Backoff::default())
        .await;

    let mut shutdown = Shutdown::new();

    if config.status.enabled {
        let listener = TcpListener::bind(&config.status.bind_address).await?;
        let state = StatusState::new(services.registry.clone(), config.status.api_key.clone());
        shutdown.spawn("status", move |rx| async move {
            if let Err(e) = status::serve(listener, state, rx).await {
                tracing::error!(error = %e, "Status server failed");
            }
        });
    }

    let Services {
        controller,
        refresher,
        ..
    } = services;
    shutdown.spawn("controller", move |rx| controller.run(rx));
    shutdown.spawn("refresher", move |rx| refresher.run(rx));

    wait_for_shutdown_signal().await;
    shutdown.drain(Duration::from_secs(cli.grace_secs)).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
