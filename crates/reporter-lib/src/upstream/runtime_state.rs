//! HTTP client for the scheduler's actual-state registry

use super::{
    async_trait, endpoint_url, error_from_response, ActualInstances, ClientConfig,
    RuntimeStateClient,
};
use crate::error::ClientError;
use crate::models::{
    ActualInstanceRecord, DesiredRuntimeDescriptor, InstanceState, NetInfo, PortMapping,
    ProcessDescriptor,
};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

const SOURCE: &str = "runtime state";

#[derive(Debug, Deserialize)]
struct ActualLrpsResponse {
    #[serde(default)]
    actual_lrps: Vec<ActualLrp>,
}

#[derive(Debug, Deserialize)]
struct ActualLrp {
    actual_lrp_key: ActualLrpKey,
    #[serde(default)]
    actual_lrp_instance_key: ActualLrpInstanceKey,
    state: InstanceState,
    #[serde(default)]
    placement_error: String,
    #[serde(default)]
    since: i64,
    #[serde(default)]
    actual_lrp_net_info: Option<ActualLrpNetInfo>,
}

#[derive(Debug, Deserialize)]
struct ActualLrpKey {
    index: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ActualLrpInstanceKey {
    #[serde(default)]
    instance_guid: String,
}

#[derive(Debug, Deserialize)]
struct ActualLrpNetInfo {
    #[serde(default)]
    address: String,
    #[serde(default)]
    ports: Vec<WirePortMapping>,
}

#[derive(Debug, Deserialize)]
struct WirePortMapping {
    container_port: u32,
    #[serde(default)]
    host_port: u32,
}

#[derive(Debug, Deserialize)]
struct DesiredLrpResponse {
    desired_lrp: DesiredLrp,
}

#[derive(Debug, Deserialize)]
struct DesiredLrp {
    #[serde(default)]
    placement_tags: Vec<String>,
}

impl From<ActualLrp> for ActualInstanceRecord {
    fn from(lrp: ActualLrp) -> Self {
        let placement_error = if lrp.placement_error.is_empty() {
            None
        } else {
            Some(lrp.placement_error)
        };

        ActualInstanceRecord {
            index: lrp.actual_lrp_key.index,
            instance_guid: lrp.actual_lrp_instance_key.instance_guid,
            state: lrp.state,
            placement_error,
            since: lrp.since,
            net_info: lrp.actual_lrp_net_info.map(|info| NetInfo {
                address: info.address,
                ports: info
                    .ports
                    .into_iter()
                    .map(|p| PortMapping {
                        container_port: p.container_port,
                        host_port: p.host_port,
                    })
                    .collect(),
            }),
        }
    }
}

/// Actual-state registry reached over HTTP/JSON
pub struct HttpRuntimeStateClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl HttpRuntimeStateClient {
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
impl RuntimeStateClient for HttpRuntimeStateClient {
    async fn list_actual_instances(
        &self,
        process: &ProcessDescriptor,
    ) -> Result<ActualInstances, ClientError> {
        let process_guid = process.scheduling_guid();
        let mut url = endpoint_url(&self.base_url, &["v1", "actual_lrps"])?;
        url.query_pairs_mut().append_pair("process_guid", &process_guid);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to list actual instances for {}", process_guid))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(process_guid = %process_guid, "Registry has no instances for process");
            return Ok(ActualInstances::NoneRunning(format!(
                "no running instances for {}",
                process_guid
            )));
        }
        if !response.status().is_success() {
            return Err(error_from_response(SOURCE, response).await);
        }

        let body: ActualLrpsResponse = response
            .json()
            .await
            .context("Failed to parse actual instances response")?;

        if body.actual_lrps.is_empty() {
            return Ok(ActualInstances::NoneRunning(format!(
                "no running instances for {}",
                process_guid
            )));
        }

        Ok(ActualInstances::Running(
            body.actual_lrps.into_iter().map(Into::into).collect(),
        ))
    }

    async fn desired_descriptor(
        &self,
        process: &ProcessDescriptor,
    ) -> Result<DesiredRuntimeDescriptor, ClientError> {
        let process_guid = process.scheduling_guid();
        let url = endpoint_url(&self.base_url, &["v1", "desired_lrps", process_guid.as_str()])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch desired state for {}", process_guid))?;

        if !response.status().is_success() {
            return Err(error_from_response(SOURCE, response).await);
        }

        let body: DesiredLrpResponse = response
            .json()
            .await
            .context("Failed to parse desired state response")?;

        Ok(DesiredRuntimeDescriptor {
            placement_tags: body.desired_lrp.placement_tags,
        })
    }
}
