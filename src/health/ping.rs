//! Machine reachability via the system `ping` utility.
//!
//! Raw ICMP sockets need elevated privileges, so the probe shells out to
//! `ping -c <count> -W <secs> <identity>` and reads the exit status. The
//! child is killed if the outer deadline fires first.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::health::probe::MachineProbe;

/// Echo-request implementation of [`MachineProbe`].
#[derive(Debug, Clone)]
pub struct PingProbe {
    program: String,
    count: u32,
    reply_timeout_secs: u64,
}

impl PingProbe {
    pub fn new(config: &HealthCheckConfig) -> Self {
        Self {
            program: "ping".to_string(),
            count: config.ping_count,
            reply_timeout_secs: config.ping_timeout_secs,
        }
    }

    /// Use a different executable with the same argument shape.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Overall budget: one reply window per echo request.
    fn deadline(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs.saturating_mul(u64::from(self.count.max(1))))
    }
}

/// Accept IP literals and plain hostnames. Anything else could be read by
/// `ping` as an option.
fn is_valid_target(identity: &str) -> bool {
    if identity.parse::<IpAddr>().is_ok() {
        return true;
    }
    !identity.is_empty()
        && identity.len() <= 253
        && identity.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[async_trait]
impl MachineProbe for PingProbe {
    async fn check_machine(&self, identity: &str) -> bool {
        if !is_valid_target(identity) {
            tracing::warn!(identity = %identity, "Refusing to ping invalid target");
            return false;
        }

        let mut command = Command::new(&self.program);
        command
            .arg("-c")
            .arg(self.count.to_string())
            .arg("-W")
            .arg(self.reply_timeout_secs.to_string())
            .arg(identity)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(identity = %identity, program = %self.program, error = %e, "Failed to spawn reachability probe");
                return false;
            }
        };

        match time::timeout(self.deadline(), child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let reachable = output.status.success();
                if reachable {
                    tracing::debug!(identity = %identity, "Machine responds to ping");
                } else {
                    tracing::warn!(identity = %identity, status = %output.status, "Machine does not respond to ping");
                }
                reachable
            }
            Ok(Err(e)) => {
                tracing::warn!(identity = %identity, error = %e, "Reachability probe failed");
                false
            }
            Err(_) => {
                tracing::warn!(identity = %identity, "Reachability probe timed out");
                false
            }
        }
    }
}
