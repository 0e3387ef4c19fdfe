//! End-to-end evaluation cycle tests against in-memory collaborators.

use std::io::{self, Write};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use dns_failover::config::FailoverConfig;
use dns_failover::failover::{CycleReport, CycleSummary};
use dns_failover::lifecycle::{Collaborators, Services};
use dns_failover::provider::RecordHandle;
use dns_failover::resilience::Backoff;
use tracing_subscriber::fmt::MakeWriter;

mod common;

use common::{record, FakeStore, FixedMachineProbe, RecordingSink, ScriptedProbe};

/// Captures formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn count(&self, needle: &str) -> usize {
        String::from_utf8_lossy(&self.0.lock().unwrap()).matches(needle).count()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

struct Harness {
    store: Arc<FakeStore>,
    sink: Arc<RecordingSink>,
    probe: Arc<ScriptedProbe>,
    machine: Arc<FixedMachineProbe>,
    services: Services,
}

impl Harness {
    async fn new(ips: &[&str], configure: impl FnOnce(&mut FailoverConfig)) -> Self {
        let records = ips
            .iter()
            .enumerate()
            .map(|(i, ip)| record(ip, &format!("rec-{}", i)))
            .collect();
        let store = FakeStore::with_records(records);
        let sink = Arc::new(RecordingSink::default());
        let probe = Arc::new(ScriptedProbe::default());
        let machine = Arc::new(FixedMachineProbe::default());

        let mut config = FailoverConfig::default();
        config.dns.record_name = "pool.example.com".into();
        configure(&mut config);

        let services = Services::assemble(
            &config,
            Collaborators {
                store: store.clone(),
                sink: sink.clone(),
                service_probe: probe.clone(),
                machine_probe: machine.clone(),
            },
        );
        services.initial_load(1, Backoff::new(1, 1)).await;

        Self {
            store,
            sink,
            probe,
            machine,
            services,
        }
    }

    async fn cycle(&self) -> CycleSummary {
        match self.services.controller.run_cycle().await {
            CycleReport::Completed(summary) => summary,
            CycleReport::Skipped => panic!("cycle unexpectedly skipped"),
        }
    }

    fn failures(&self, identity: &str) -> Option<u32> {
        self.services.registry.get(identity).map(|s| s.failures())
    }
}

#[tokio::test]
async fn test_three_unhealthy_cycles_remove_server_once() {
    let h = Harness::new(&["203.0.113.10", "203.0.113.11"], |_| {}).await;
    h.probe.set_healthy("203.0.113.10", false);

    for expected in 1..=2 {
        let summary = h.cycle().await;
        assert_eq!(summary.unhealthy, 1);
        assert_eq!(summary.removed, 0);
        assert_eq!(h.failures("203.0.113.10"), Some(expected));
    }
    assert!(h.sink.messages().is_empty());

    let summary = h.cycle().await;
    assert_eq!(summary.alerts_sent, 1);
    assert_eq!(summary.removed, 1);
    assert_eq!(h.sink.messages().len(), 1);
    assert!(h.sink.messages()[0].contains("IP: 203.0.113.10"));
    assert_eq!(h.store.deleted(), vec![RecordHandle::from("rec-0")]);

    let summary = h.cycle().await;
    assert_eq!(summary.evaluated, 1);
    assert!(h.services.registry.get("203.0.113.10").is_none());
    assert_eq!(h.sink.messages().len(), 1);
    assert_eq!(h.store.deleted().len(), 1);
}

#[tokio::test]
async fn test_intermittent_failures_never_reach_removal() {
    let h = Harness::new(&["203.0.113.10"], |_| {}).await;

    h.cycle().await;
    assert_eq!(h.failures("203.0.113.10"), Some(0));

    h.probe.set_healthy("203.0.113.10", false);
    h.cycle().await;
    assert_eq!(h.failures("203.0.113.10"), Some(1));
    h.cycle().await;
    assert_eq!(h.failures("203.0.113.10"), Some(2));

    h.probe.set_healthy("203.0.113.10", true);
    let summary = h.cycle().await;
    assert_eq!(summary.healthy, 1);
    assert_eq!(h.failures("203.0.113.10"), Some(0));

    assert!(h.sink.messages().is_empty());
    assert!(h.store.deleted().is_empty());
}

#[tokio::test]
async fn test_empty_pool_skips_without_probing() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let h = Harness::new(&[], |_| {}).await;

    assert_eq!(h.services.controller.run_cycle().await, CycleReport::Skipped);
    assert_eq!(logs.count("No servers in pool, skipping health check cycle"), 1);

    assert_eq!(h.services.controller.run_cycle().await, CycleReport::Skipped);
    assert_eq!(logs.count("No servers in pool, skipping health check cycle"), 2);

    assert_eq!(logs.count("Starting health check cycle"), 0);
    assert_eq!(logs.count("Health check cycle complete"), 0);
    assert_eq!(h.probe.call_count(), 0);
    assert_eq!(h.machine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_auxiliary_endpoint_is_healthy() {
    let h = Harness::new(&["203.0.113.10"], |_| {}).await;

    let summary = h.cycle().await;
    assert_eq!(summary.healthy, 1);
    assert_eq!(h.failures("203.0.113.10"), Some(0));
    assert_eq!(h.probe.call_count(), 1);
}

#[tokio::test]
async fn test_auxiliary_failure_counts_and_is_named_in_alert() {
    let h = Harness::new(&["203.0.113.10"], |c| {
        c.failover.failure_threshold = 1;
        c.auxiliary_endpoints
            .insert("203.0.113.10".into(), "http://10.0.0.10:8080".into());
    })
    .await;
    h.probe.set_healthy("10.0.0.10", false);

    let summary = h.cycle().await;
    assert_eq!(h.probe.call_count(), 2);
    assert_eq!(summary.removed, 1);

    let alert = &h.sink.messages()[0];
    assert!(alert.contains("Failed probes: auxiliary"));
}

#[tokio::test]
async fn test_reachability_is_diagnostic_only() {
    let h = Harness::new(&["203.0.113.10", "203.0.113.11"], |c| {
        c.failover.failure_threshold = 1;
    })
    .await;
    h.machine.reachable.store(true, Ordering::SeqCst);
    h.probe.set_healthy("203.0.113.11", false);

    let summary = h.cycle().await;
    // Only the unhealthy server is pinged.
    assert_eq!(h.machine.calls.load(Ordering::SeqCst), 1);
    // A machine that answers ping is still removed.
    assert_eq!(summary.removed, 1);
    assert!(h.sink.messages()[0].contains("Machine: responds to ping"));
}

#[tokio::test]
async fn test_failed_removal_realerts_every_cycle_by_default() {
    let h = Harness::new(&["203.0.113.10"], |_| {}).await;
    h.probe.set_healthy("203.0.113.10", false);
    h.store.fail_delete.store(true, Ordering::SeqCst);

    for _ in 0..5 {
        h.cycle().await;
    }
    // Threshold reached in cycle 3; cycles 3, 4 and 5 each alert and retry.
    assert_eq!(h.sink.messages().len(), 3);
    assert_eq!(h.failures("203.0.113.10"), Some(5));
    assert_eq!(h.services.registry.len(), 1);
}

#[tokio::test]
async fn test_failed_removal_retries_without_realerting_when_suppressed() {
    let h = Harness::new(&["203.0.113.10"], |c| {
        c.failover.failure_threshold = 2;
        c.failover.realert_on_failed_removal = false;
    })
    .await;
    h.probe.set_healthy("203.0.113.10", false);
    h.store.fail_delete.store(true, Ordering::SeqCst);

    h.cycle().await;
    let summary = h.cycle().await;
    assert_eq!(summary.removal_failures, 1);
    assert_eq!(h.failures("203.0.113.10"), Some(2));
    assert_eq!(h.sink.messages().len(), 1);

    let summary = h.cycle().await;
    assert_eq!(summary.removal_failures, 1);
    assert_eq!(summary.alerts_sent, 0);
    assert_eq!(h.sink.messages().len(), 1);
    assert_eq!(h.failures("203.0.113.10"), Some(3));

    h.store.fail_delete.store(false, Ordering::SeqCst);
    let summary = h.cycle().await;
    assert_eq!(summary.removed, 1);
    assert_eq!(h.sink.messages().len(), 1);
    assert!(h.services.registry.is_empty());
}

#[tokio::test]
async fn test_recovery_resets_alert_streak() {
    let h = Harness::new(&["203.0.113.10"], |c| {
        c.failover.failure_threshold = 1;
        c.failover.realert_on_failed_removal = false;
    })
    .await;
    h.store.fail_delete.store(true, Ordering::SeqCst);

    h.probe.set_healthy("203.0.113.10", false);
    h.cycle().await;
    assert_eq!(h.sink.messages().len(), 1);

    h.probe.set_healthy("203.0.113.10", true);
    h.cycle().await;
    assert!(!h.services.registry.get("203.0.113.10").unwrap().is_alerted());

    h.probe.set_healthy("203.0.113.10", false);
    h.cycle().await;
    assert_eq!(h.sink.messages().len(), 2);
}

#[tokio::test]
async fn test_alert_failure_does_not_block_removal() {
    let h = Harness::new(&["203.0.113.10"], |c| {
        c.failover.failure_threshold = 1;
    })
    .await;
    h.sink.fail.store(true, Ordering::SeqCst);
    h.probe.set_healthy("203.0.113.10", false);

    let summary = h.cycle().await;
    assert_eq!(summary.alerts_sent, 0);
    assert_eq!(summary.removed, 1);
    assert!(h.services.registry.is_empty());
}

#[tokio::test]
async fn test_one_failed_removal_does_not_stop_the_cycle() {
    let h = Harness::new(&["203.0.113.10", "203.0.113.11", "203.0.113.12"], |c| {
        c.failover.failure_threshold = 1;
    })
    .await;
    h.store.fail_delete.store(true, Ordering::SeqCst);
    h.probe.set_healthy("203.0.113.10", false);
    h.probe.set_healthy("203.0.113.12", false);

    let summary = h.cycle().await;
    assert_eq!(summary.evaluated, 3);
    assert_eq!(summary.healthy, 1);
    assert_eq!(summary.unhealthy, 2);
    assert_eq!(summary.removal_failures, 2);
    assert_eq!(h.sink.messages().len(), 2);
}

#[tokio::test]
async fn test_refresh_reinstates_removed_server_as_healthy() {
    let h = Harness::new(&["203.0.113.10", "203.0.113.11"], |c| {
        c.failover.failure_threshold = 1;
    })
    .await;
    h.probe.set_healthy("203.0.113.10", false);

    let summary = h.cycle().await;
    assert_eq!(summary.removed, 1);
    assert!(h.services.registry.get("203.0.113.10").is_none());
    assert_eq!(h.store.deleted(), vec![RecordHandle::from("rec-0")]);

    // Operator fixes the server and recreates its record.
    h.probe.set_healthy("203.0.113.10", true);
    h.store
        .records
        .lock()
        .unwrap()
        .push(record("203.0.113.10", "rec-reinstated"));
    h.services.registry.refresh().await.unwrap();

    let server = h.services.registry.get("203.0.113.10").unwrap();
    assert_eq!(server.failures(), 0);
    assert!(!server.is_alerted());
    assert_eq!(server.record_handle, RecordHandle::from("rec-reinstated"));

    let summary = h.cycle().await;
    assert_eq!(summary.healthy, 2);
    assert_eq!(h.sink.messages().len(), 1);
}

#[tokio::test]
async fn test_refresh_resets_counts_of_failing_servers() {
    let h = Harness::new(&["203.0.113.10", "203.0.113.11"], |_| {}).await;
    h.probe.set_healthy("203.0.113.11", false);
    h.cycle().await;
    h.cycle().await;
    assert_eq!(h.failures("203.0.113.11"), Some(2));

    h.services.registry.refresh().await.unwrap();
    assert_eq!(h.failures("203.0.113.11"), Some(0));
}

#[tokio::test]
async fn test_failed_refresh_keeps_evaluating_previous_pool() {
    let h = Harness::new(&["203.0.113.10"], |_| {}).await;
    h.store.fail_list.store(true, Ordering::SeqCst);

    assert!(h.services.registry.refresh().await.is_err());
    let summary = h.cycle().await;
    assert_eq!(summary.evaluated, 1);
}
