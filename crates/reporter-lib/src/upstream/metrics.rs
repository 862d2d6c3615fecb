//! HTTP client for the metrics aggregation service

use super::{async_trait, endpoint_url, error_from_response, ClientConfig, MetricsClient};
use crate::error::ClientError;
use crate::models::MetricSample;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

const SOURCE: &str = "metrics";

#[derive(Debug, Deserialize)]
struct EnvelopesResponse {
    #[serde(default)]
    envelopes: Vec<Envelope>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    container_metric: Option<ContainerMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerMetric {
    instance_index: u32,
    #[serde(default)]
    cpu_percentage: Option<f64>,
    #[serde(default)]
    memory_bytes: Option<u64>,
    #[serde(default)]
    disk_bytes: Option<u64>,
}

impl From<ContainerMetric> for MetricSample {
    fn from(metric: ContainerMetric) -> Self {
        MetricSample {
            instance_index: metric.instance_index,
            // Reported as a percentage of one core
            cpu: metric.cpu_percentage.map(|pct| pct / 100.0),
            memory_bytes: metric.memory_bytes,
            disk_bytes: metric.disk_bytes,
        }
    }
}

/// Metrics aggregation service reached over HTTP/JSON
pub struct HttpMetricsClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl HttpMetricsClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: config.build_http_client()?,
            base_url: config.base_url()?,
        })
    }

    /// Get the base URL
    pub fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }
}

#[async_trait]
impl MetricsClient for HttpMetricsClient {
    async fn container_metrics(
        &self,
        auth_token: &str,
        process_guid: &str,
    ) -> Result<Vec<MetricSample>, ClientError> {
        let url = endpoint_url(&self.base_url, &["apps", process_guid, "containermetrics"])?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, auth_token)
            .send()
            .await
            .with_context(|| format!("Failed to fetch container metrics for {}", process_guid))?;

        if !response.status().is_success() {
            return Err(error_from_response(SOURCE, response).await);
        }

        let body: EnvelopesResponse = response
            .json()
            .await
            .context("Failed to parse container metrics response")?;

        let samples: Vec<MetricSample> = body
            .envelopes
            .into_iter()
            .filter_map(|envelope| envelope.container_metric)
            .map(Into::into)
            .collect();

        debug!(
            process_guid = %process_guid,
            samples = samples.len(),
            "Fetched container metrics"
        );

        Ok(samples)
    }
}
