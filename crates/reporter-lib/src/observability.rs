//! Observability infrastructure for the instance stats reporter
//!
//! Provides:
//! - Prometheus metrics (reconcile latency, upstream errors, reported states)
//! - Structured logging with tracing

use crate::models::InstanceReport;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};
use std::sync::OnceLock;
use tracing::{debug, error};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ReporterMetricsInner> = OnceLock::new();

/// Upstream sources, used as metric labels and log fields
pub mod sources {
    pub const ACTUAL_STATE: &str = "actual_state";
    pub const DESIRED_STATE: &str = "desired_state";
    pub const METRICS: &str = "metrics";
}

struct ReporterMetricsInner {
    reconcile_latency_seconds: Histogram,
    upstream_errors: IntCounterVec,
    instances_reported: IntCounterVec,
}

impl ReporterMetricsInner {
    fn new() -> Self {
        Self {
            reconcile_latency_seconds: register_histogram!(
                "instance_reporter_reconcile_latency_seconds",
                "Time spent building a per-instance stats report",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register reconcile_latency_seconds"),

            upstream_errors: register_int_counter_vec!(
                "instance_reporter_upstream_errors_total",
                "Upstream failures that aborted a report, by source",
                &["source"]
            )
            .expect("Failed to register upstream_errors_total"),

            instances_reported: register_int_counter_vec!(
                "instance_reporter_instances_reported_total",
                "Instances emitted in reports, by lifecycle state",
                &["state"]
            )
            .expect("Failed to register instances_reported_total"),
        }
    }
}

/// Reporter metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ReporterMetrics {
    _private: (),
}

impl Default for ReporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ReporterMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ReporterMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ReporterMetricsInner {
        GLOBAL_METRICS.get_or_init(ReporterMetricsInner::new)
    }

    /// Record how long one report took
    pub fn observe_reconcile_latency(&self, duration_secs: f64) {
        self.inner().reconcile_latency_seconds.observe(duration_secs);
    }

    /// Count an upstream failure
    pub fn inc_upstream_errors(&self, source: &str) {
        self.inner()
            .upstream_errors
            .with_label_values(&[source])
            .inc();
    }

    /// Count every instance in a finished report by state
    pub fn record_report(&self, report: &InstanceReport) {
        for status in report.values() {
            self.inner()
                .instances_reported
                .with_label_values(&[status.state.as_str()])
                .inc();
        }
    }
}

/// Structured logger for reporter events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Log the start of an upstream fetch
    pub fn log_fetch(&self, process_guid: &str, source: &str) {
        debug!(
            event = "stats_for_process.fetching",
            component = %self.component,
            process_guid = %process_guid,
            source = %source,
            "Fetching upstream data"
        );
    }

    /// Log the benign "nothing running" answer from the registry
    pub fn log_none_running(&self, process_guid: &str, reason: &str) {
        debug!(
            event = "stats_for_process.no_running_instances",
            component = %self.component,
            process_guid = %process_guid,
            reason = %reason,
            "No running instances, reporting all desired instances as down"
        );
    }

    /// Log an upstream failure at the point it is classified
    pub fn log_upstream_error(&self, process_guid: &str, source: &str, error: &str) {
        error!(
            event = "stats_for_process.error",
            component = %self.component,
            process_guid = %process_guid,
            source = %source,
            error = %error,
            "Upstream failure while building instance stats"
        );
    }

    /// Log a completed report
    pub fn log_report(&self, process_guid: &str, desired: u32, report: &InstanceReport) {
        let running = report
            .values()
            .filter(|s| s.stats.is_some())
            .count();
        debug!(
            event = "stats_for_process.reported",
            component = %self.component,
            process_guid = %process_guid,
            desired_instances = desired,
            reported = report.len(),
            running = running,
            "Built instance stats report"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstanceStatus;

    #[test]
    fn test_reporter_metrics_creation() {
        let metrics = ReporterMetrics::new();

        metrics.observe_reconcile_latency(0.01);
        metrics.inc_upstream_errors(sources::METRICS);

        let mut report = InstanceReport::new();
        report.insert(0, InstanceStatus::down());
        metrics.record_report(&report);

        // A second handle shares the registered metrics
        let again = ReporterMetrics::new();
        again.inc_upstream_errors(sources::ACTUAL_STATE);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("instances_stats_reporter");
        assert_eq!(logger.component, "instances_stats_reporter");
    }
}
