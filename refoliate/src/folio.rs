//! FOLIO Okapi record-storage client
//!
//! Thin façade over the storage endpoints: one existence check and one
//! create per record kind. `RecordStore` is the seam the replay engine is
//! written against, so tests can substitute a scripted in-memory store.

use crate::config::FolioConfig;
use crate::error::{RestoreError, Result};
use crate::records::{RawRecord, RecordKind};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("refoliate/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Result of a create request that reached FOLIO
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Record was stored; `id` is the identifier FOLIO reported back
    Created { id: String },
    /// FOLIO refused the record (4xx) with its validation messages
    Rejected { messages: Vec<String> },
}

/// Storage operations the replay engine needs, per record kind
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a record of this kind with this id already exists
    ///
    /// Any response below 400 counts as "exists"; a 4xx (including 404)
    /// counts as "does not exist". 5xx and transport failures are fatal.
    async fn exists(&self, kind: RecordKind, id: &str) -> Result<bool>;

    /// Create a record from its exported payload
    ///
    /// 4xx responses (typically 422) surface as `CreateOutcome::Rejected`;
    /// 5xx and transport failures are fatal.
    async fn create(&self, kind: RecordKind, record: &RawRecord) -> Result<CreateOutcome>;
}

/// Okapi-backed implementation of `RecordStore`
pub struct FolioClient {
    http_client: reqwest::Client,
    config: FolioConfig,
}

impl FolioClient {
    pub fn new(config: FolioConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RestoreError::RemoteServer {
                status: None,
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Cheap credential/connectivity probe issued before any restore work
    pub async fn check_connection(&self) -> Result<()> {
        let url = format!("{}/instance-statuses?limit=0", self.config.okapi_url);
        tracing::debug!(url = %url, "testing FOLIO connectivity");

        let response = self.get(&url).await?;
        let status = response.status();
        if status.as_u16() < 400 {
            Ok(())
        } else {
            Err(RestoreError::RemoteServer {
                status: Some(status.as_u16()),
                message: "credential check failed".to_string(),
            })
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.with_headers(self.http_client.get(url))
            .send()
            .await
            .map_err(transport_error)
    }

    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-okapi-token", &self.config.token)
            .header("x-okapi-tenant", &self.config.tenant_id)
            .header("content-type", "application/json")
    }

    fn collection_url(&self, kind: RecordKind) -> Result<String> {
        // The replay engine only ever passes the three typed kinds; an
        // unknown kind reaching this point is a bug in the caller.
        let path = kind.collection_path().ok_or_else(|| {
            RestoreError::Internal(format!("no storage endpoint for {} records", kind))
        })?;
        Ok(format!("{}{}", self.config.okapi_url, path))
    }
}

#[async_trait]
impl RecordStore for FolioClient {
    async fn exists(&self, kind: RecordKind, id: &str) -> Result<bool> {
        let url = format!("{}/{}", self.collection_url(kind)?, id);
        tracing::debug!(%kind, id = %id, "checking record existence");

        let response = self.get(&url).await?;
        let status = response.status();

        if status.is_server_error() {
            return Err(server_error(status.as_u16(), response).await);
        }

        Ok(status.as_u16() < 400)
    }

    async fn create(&self, kind: RecordKind, record: &RawRecord) -> Result<CreateOutcome> {
        let url = self.collection_url(kind)?;
        tracing::debug!(%kind, id = %record.id, "creating record");

        let response = self
            .with_headers(self.http_client.post(&url))
            .json(&record.body)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();

        if status.is_server_error() {
            return Err(server_error(status.as_u16(), response).await);
        }

        if status.is_success() {
            // FOLIO echoes the stored record on 201; 204 has no body, in
            // which case the caller-supplied id is taken as confirmed.
            let body = response.text().await.unwrap_or_default();
            let id = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| record.id.clone());
            return Ok(CreateOutcome::Created { id });
        }

        let body = response.text().await.unwrap_or_default();
        Ok(CreateOutcome::Rejected {
            messages: rejection_messages(&body),
        })
    }
}

fn transport_error(e: reqwest::Error) -> RestoreError {
    RestoreError::RemoteServer {
        status: None,
        message: e.to_string(),
    }
}

async fn server_error(status: u16, response: reqwest::Response) -> RestoreError {
    let message = response.text().await.unwrap_or_default();
    RestoreError::RemoteServer {
        status: Some(status),
        message,
    }
}

/// Extract FOLIO's validation messages from a 4xx response body
///
/// Storage modules answer 422 with `{"errors": [{"message": ...}, ...]}`.
/// Anything else (plain-text 400s included) is passed through verbatim.
fn rejection_messages(body: &str) -> Vec<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if !messages.is_empty() {
                return messages;
            }
        }
    }

    if body.trim().is_empty() {
        vec!["record rejected with no explanation".to_string()]
    } else {
        vec![body.trim().to_string()]
    }
}
