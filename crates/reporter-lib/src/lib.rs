//! Instance stats reporter library
//!
//! This crate provides the core functionality for:
//! - Joining desired and actual instance state for a process
//! - Enriching running instances with resource-usage telemetry
//! - Normalizing units and defaults into a per-instance report
//! - HTTP adapters for the actual-state registry and metrics service
//! - Structured logging and Prometheus metrics

pub mod error;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod reconciler;
pub mod upstream;

pub use error::{ClientError, InstancesUnavailable};
pub use models::*;
pub use observability::{ReporterMetrics, StructuredLogger};
pub use reconciler::{InstanceReconciler, InstanceReconcilerBuilder};
pub use upstream::{
    ActualInstances, AuthTokenProvider, MetricsClient, RuntimeStateClient, StaticToken,
};
