//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use dns_failover::alert::{AlertError, AlertSink};
use dns_failover::health::{MachineProbe, ServiceProbe};
use dns_failover::provider::{DnsRecord, RecordHandle, RecordStore, RecordStoreError, RecordStoreResult};

/// A request seen by the programmable backend.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub target: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// The handler receives each parsed request and returns `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            204 => "204 No Content",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that always answers with `status`.
pub async fn start_fixed_backend(status: u16) -> SocketAddr {
    start_programmable_backend(move |_| async move { (status, "pong".to_string()) }).await
}

/// Accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(MockRequest {
        method,
        target,
        headers,
        body,
    })
}

pub fn record(ip: &str, id: &str) -> DnsRecord {
    DnsRecord {
        name: "pool.example.com".into(),
        content: ip.into(),
        handle: RecordHandle::from(id),
    }
}

/// In-memory record store.
#[derive(Default)]
pub struct FakeStore {
    pub records: Mutex<Vec<DnsRecord>>,
    pub fail_list: AtomicBool,
    pub fail_delete: AtomicBool,
    pub deleted: Mutex<Vec<RecordHandle>>,
    pub list_calls: AtomicUsize,
}

impl FakeStore {
    pub fn with_records(records: Vec<DnsRecord>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Self::default()
        })
    }

    pub fn deleted(&self) -> Vec<RecordHandle> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn list(&self, _record_name: &str) -> RecordStoreResult<Vec<DnsRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RecordStoreError::Transport("connection refused".into()));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn delete(&self, handle: &RecordHandle) -> RecordStoreResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RecordStoreError::Api("1000: delete rejected".into()));
        }
        self.records.lock().unwrap().retain(|r| &r.handle != handle);
        self.deleted.lock().unwrap().push(handle.clone());
        Ok(())
    }
}

/// Alert sink that records every message.
#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<(), AlertError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(AlertError::Transport("sink down".into()));
        }
        Ok(())
    }
}

/// Service probe answering from a per-host table. Unknown hosts are healthy.
#[derive(Default)]
pub struct ScriptedProbe {
    pub unhealthy_hosts: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn set_healthy(&self, host: &str, healthy: bool) {
        let mut hosts = self.unhealthy_hosts.lock().unwrap();
        hosts.retain(|h| h != host);
        if !healthy {
            hosts.push(host.to_string());
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ServiceProbe for ScriptedProbe {
    async fn check_service(&self, endpoint: &Url) -> bool {
        let host = endpoint.host_str().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(endpoint.to_string());
        !self.unhealthy_hosts.lock().unwrap().contains(&host)
    }
}

/// Reachability probe with a fixed answer.
#[derive(Default)]
pub struct FixedMachineProbe {
    pub reachable: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl MachineProbe for FixedMachineProbe {
    async fn check_machine(&self, _identity: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reachable.load(Ordering::SeqCst)
    }
}
