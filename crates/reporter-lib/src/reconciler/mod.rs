//! Instance reconciliation
//!
//! Joins the scheduler's actual instance records with the metrics service's
//! usage samples into one status-and-stats entry per desired instance index.
//! Each call is independent: the reconciler holds only its collaborators,
//! so concurrent calls for different processes need no coordination.

mod join;


pub use join::build_report;

use crate::error::{ClientError, InstancesUnavailable};
use crate::models::{InstanceReport, ProcessDescriptor};
use crate::normalize::{isolation_segment, DEFAULT_CONTAINER_PORT};
use crate::observability::{sources, ReporterMetrics, StructuredLogger};
use crate::upstream::{ActualInstances, AuthTokenProvider, MetricsClient, RuntimeStateClient};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

const COMPONENT: &str = "instances_stats_reporter";

/// Builds per-instance status and stats reports for a process
pub struct InstanceReconciler {
    runtime_state: Arc<dyn RuntimeStateClient>,
    metrics_client: Arc<dyn MetricsClient>,
    token_provider: Arc<dyn AuthTokenProvider>,
    default_port: u32,
    logger: StructuredLogger,
    metrics: ReporterMetrics,
}

impl InstanceReconciler {
    pub fn new(
        runtime_state: Arc<dyn RuntimeStateClient>,
        metrics_client: Arc<dyn MetricsClient>,
        token_provider: Arc<dyn AuthTokenProvider>,
    ) -> Self {
        Self {
            runtime_state,
            metrics_client,
            token_provider,
            default_port: DEFAULT_CONTAINER_PORT,
            logger: StructuredLogger::new(COMPONENT),
            metrics: ReporterMetrics::new(),
        }
    }

    /// Container port whose host mapping is reported as `port`
    pub fn default_port(&self) -> u32 {
        self.default_port
    }

    /// Report on every desired instance of `process` as of now
    pub async fn stats_for_process(
        &self,
        process: &ProcessDescriptor,
    ) -> Result<InstanceReport, InstancesUnavailable> {
        self.stats_for_process_at(process, Utc::now()).await
    }

    /// Report on every desired instance of `process` as of `now`
    pub async fn stats_for_process_at(
        &self,
        process: &ProcessDescriptor,
        now: DateTime<Utc>,
    ) -> Result<InstanceReport, InstancesUnavailable> {
        let started = Instant::now();

        self.logger.log_fetch(&process.guid, sources::ACTUAL_STATE);
        let records = match self.runtime_state.list_actual_instances(process).await {
            Ok(ActualInstances::Running(records)) => records,
            Ok(ActualInstances::NoneRunning(reason)) => {
                self.logger.log_none_running(&process.guid, &reason);
                Vec::new()
            }
            Err(e) => return Err(self.translate_error(process, sources::ACTUAL_STATE, e)),
        };

        // Placement tags only matter when some instance can be reported as running
        let segment = if records.is_empty() {
            None
        } else {
            self.logger.log_fetch(&process.guid, sources::DESIRED_STATE);
            let desired = self
                .runtime_state
                .desired_descriptor(process)
                .await
                .map_err(|e| self.translate_error(process, sources::DESIRED_STATE, e))?;
            isolation_segment(&desired)
        };

        self.logger.log_fetch(&process.guid, sources::METRICS);
        let auth_token = self.token_provider.auth_token();
        let samples = self
            .metrics_client
            .container_metrics(&auth_token, &process.guid)
            .await
            .map_err(|e| self.translate_error(process, sources::METRICS, e))?;

        let report = build_report(
            process,
            &records,
            segment.as_deref(),
            &samples,
            now,
            self.default_port,
        );

        self.metrics
            .observe_reconcile_latency(started.elapsed().as_secs_f64());
        self.metrics.record_report(&report);
        self.logger.log_report(&process.guid, process.instances, &report);

        Ok(report)
    }

    /// Classify an upstream failure. The only place errors are logged.
    fn translate_error(
        &self,
        process: &ProcessDescriptor,
        source: &str,
        error: ClientError,
    ) -> InstancesUnavailable {
        match error {
            ClientError::Unavailable(already_classified) => already_classified,
            ClientError::Other(e) => {
                let message = format!("{:#}", e);
                self.logger
                    .log_upstream_error(&process.guid, source, &message);
                self.metrics.inc_upstream_errors(source);
                InstancesUnavailable::new(message)
            }
        }
    }
}

/// Builder for InstanceReconciler
pub struct InstanceReconcilerBuilder {
    runtime_state: Option<Arc<dyn RuntimeStateClient>>,
    metrics_client: Option<Arc<dyn MetricsClient>>,
    token_provider: Option<Arc<dyn AuthTokenProvider>>,
    default_port: u32,
}

impl InstanceReconcilerBuilder {
    pub fn new() -> Self {
        Self {
            runtime_state: None,
            metrics_client: None,
            token_provider: None,
            default_port: DEFAULT_CONTAINER_PORT,
        }
    }

    pub fn runtime_state(mut self, client: Arc<dyn RuntimeStateClient>) -> Self {
        self.runtime_state = Some(client);
        self
    }

    pub fn metrics_client(mut self, client: Arc<dyn MetricsClient>) -> Self {
        self.metrics_client = Some(client);
        self
    }

    pub fn token_provider(mut self, provider: Arc<dyn AuthTokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn default_port(mut self, port: u32) -> Self {
        self.default_port = port;
        self
    }

    pub fn build(self) -> Result<InstanceReconciler> {
        let runtime_state = self
            .runtime_state
            .ok_or_else(|| anyhow::anyhow!("runtime state client is required"))?;
        let metrics_client = self
            .metrics_client
            .ok_or_else(|| anyhow::anyhow!("metrics client is required"))?;
        let token_provider = self
            .token_provider
            .ok_or_else(|| anyhow::anyhow!("auth token provider is required"))?;

        let mut reconciler = InstanceReconciler::new(runtime_state, metrics_client, token_provider);
        reconciler.default_port = self.default_port;
        Ok(reconciler)
    }
}

impl Default for InstanceReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
