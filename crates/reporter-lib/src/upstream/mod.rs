//! Contracts for the upstream data sources
//!
//! The reconciler reads from two independently failing services:
//! - the actual-state registry of the scheduler (instances, placement tags)
//! - the metrics aggregation service (per-instance resource usage)
//!
//! HTTP-backed implementations of both live in the submodules.

mod metrics;
mod runtime_state;

pub use metrics::HttpMetricsClient;
pub use runtime_state::HttpRuntimeStateClient;

use crate::error::ClientError;
use crate::models::{ActualInstanceRecord, DesiredRuntimeDescriptor, MetricSample, ProcessDescriptor};
use anyhow::{anyhow, Context, Result};
use std::time::Duration;

pub use async_trait::async_trait;

/// Outcome of listing the actual instances of a process
#[derive(Debug, Clone)]
pub enum ActualInstances {
    Running(Vec<ActualInstanceRecord>),
    /// The registry has no instances for the process; not a failure
    NoneRunning(String),
}

/// Actual-state registry of the scheduler
#[async_trait]
pub trait RuntimeStateClient: Send + Sync {
    /// List the instances the scheduler currently tracks for `process`
    async fn list_actual_instances(
        &self,
        process: &ProcessDescriptor,
    ) -> Result<ActualInstances, ClientError>;

    /// Fetch the scheduler's desired-state record for `process`
    async fn desired_descriptor(
        &self,
        process: &ProcessDescriptor,
    ) -> Result<DesiredRuntimeDescriptor, ClientError>;
}

/// Metrics aggregation service
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Latest resource-usage samples for the instances of a process
    async fn container_metrics(
        &self,
        auth_token: &str,
        process_guid: &str,
    ) -> Result<Vec<MetricSample>, ClientError>;
}

/// Supplies the current caller's auth token
pub trait AuthTokenProvider: Send + Sync {
    fn auth_token(&self) -> String;
}

/// Token fixed at construction time
#[derive(Debug, Clone, Default)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AuthTokenProvider for StaticToken {
    fn auth_token(&self) -> String {
        self.0.clone()
    }
}

/// Timeouts and endpoint shared by the HTTP adapters
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL (e.g., "https://bbs.service.internal:8889")
    pub endpoint: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .context("Failed to create HTTP client")
    }

    pub(crate) fn base_url(&self) -> Result<url::Url> {
        let mut base = url::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", self.endpoint))?;
        // Always end in '/' so the printed endpoint is the same with or without one
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base)
    }
}

/// `base` with `segments` appended, each percent-encoded as a single segment
pub(crate) fn endpoint_url(base: &url::Url, segments: &[&str]) -> Result<url::Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("Endpoint URL cannot be a base: {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8889".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Error body used by services that classify their own failures
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub(crate) const INSTANCES_UNAVAILABLE_CODE: &str = "InstancesUnavailable";

/// Map a non-success response onto a client error
pub(crate) async fn error_from_response(source: &str, response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
        if parsed.error.as_deref() == Some(INSTANCES_UNAVAILABLE_CODE) {
            let message = parsed.message.unwrap_or_else(|| body.clone());
            return crate::error::InstancesUnavailable::new(message).into();
        }
    }

    anyhow::anyhow!("{} error ({}): {}", source, status, body).into()
}
