//! Cloudflare DNS API client.
//!
//! # Responsibilities
//! - List the A-records forming the pool
//! - Delete a single record by id
//! - Verify the API token at startup
//!
//! Every call is bounded by `dns.timeout_secs`. The v4 API wraps all
//! payloads in `{ success, errors, result }`; `success: false` is mapped
//! to `RecordStoreError::Api` with the provider's messages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::timeout;

use crate::config::DnsConfig;
use crate::provider::types::{DnsRecord, RecordHandle, RecordStoreError, RecordStoreResult};
use crate::provider::RecordStore;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RecordPayload {
    id: String,
    name: String,
    content: String,
}

/// Record store backed by the Cloudflare v4 API.
#[derive(Clone)]
pub struct CloudflareStore {
    client: Client,
    config: DnsConfig,
    timeout_duration: Duration,
}

impl CloudflareStore {
    pub fn new(config: DnsConfig) -> Self {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        Self {
            client: Client::new(),
            config,
            timeout_duration,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Send a request, decode the envelope and unwrap its `result`.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> RecordStoreResult<Option<T>> {
        let request = request.bearer_auth(&self.config.api_token);

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| RecordStoreError::Transport(e.to_string()))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| RecordStoreError::Transport(e.to_string()))?;
            Ok::<_, RecordStoreError>((status, body))
        };

        let (status, body) = match timeout(self.timeout_duration, exchange).await {
            Ok(result) => result?,
            Err(_) => return Err(RecordStoreError::Timeout(self.config.timeout_secs)),
        };

        let envelope: Envelope<T> = serde_json::from_slice(&body).map_err(|e| {
            RecordStoreError::Malformed(format!("status {}: {}", status, e))
        })?;

        if !envelope.success {
            return Err(RecordStoreError::Api(describe_errors(&envelope.errors, status)));
        }

        Ok(envelope.result)
    }
}

fn describe_errors(errors: &[ApiMessage], status: reqwest::StatusCode) -> String {
    if errors.is_empty() {
        return format!("status {}", status);
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl RecordStore for CloudflareStore {
    async fn list(&self, record_name: &str) -> RecordStoreResult<Vec<DnsRecord>> {
        let url = self.url(&format!("/zones/{}/dns_records", self.config.zone_id));
        let request = self
            .client
            .get(url)
            .query(&[("type", "A"), ("name", record_name), ("per_page", "5000")]);

        let records: Vec<RecordPayload> = self
            .call(request)
            .await?
            .ok_or_else(|| RecordStoreError::Malformed("missing result".to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| DnsRecord {
                name: r.name,
                content: r.content,
                handle: RecordHandle(r.id),
            })
            .collect())
    }

    async fn delete(&self, handle: &RecordHandle) -> RecordStoreResult<()> {
        let url = self.url(&format!(
            "/zones/{}/dns_records/{}",
            self.config.zone_id, handle
        ));
        self.call::<serde_json::Value>(self.client.delete(url)).await?;
        Ok(())
    }

    async fn verify_credentials(&self) -> RecordStoreResult<()> {
        let url = self.url("/user/tokens/verify");
        self.call::<serde_json::Value>(self.client.get(url)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for CloudflareStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareStore")
            .field("api_base", &self.config.api_base)
            .field("zone_id", &self.config.zone_id)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
