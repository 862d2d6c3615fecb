//! Unit conversion and default-value normalization
//!
//! Everything here is pure so the join can stay free of side effects.

use crate::models::{DesiredRuntimeDescriptor, MetricSample, PortMapping, UsageStats};
use chrono::{DateTime, SecondsFormat, Utc};

/// Container port applications listen on unless configured otherwise
pub const DEFAULT_CONTAINER_PORT: u32 = 8080;

const BYTES_PER_MB: u64 = 1024 * 1024;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Convert a declared MB limit to bytes
pub fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(BYTES_PER_MB)
}

/// Whole seconds between `since_nanos` and `now`, never negative
pub fn uptime_seconds(since_nanos: i64, now: DateTime<Utc>) -> u64 {
    let now_nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp().saturating_mul(NANOS_PER_SEC));
    let elapsed = now_nanos.saturating_sub(since_nanos);
    if elapsed <= 0 {
        return 0;
    }
    (elapsed / NANOS_PER_SEC) as u64
}

/// Host port bound to `container_port`; first match wins, 0 when unmapped
pub fn host_port_for(ports: &[PortMapping], container_port: u32) -> u32 {
    ports
        .iter()
        .find(|mapping| mapping.container_port == container_port)
        .map(|mapping| mapping.host_port)
        .unwrap_or(0)
}

/// Isolation segment of the process: its first placement tag
pub fn isolation_segment(desired: &DesiredRuntimeDescriptor) -> Option<String> {
    desired.placement_tags.first().cloned()
}

/// Textual timestamp stamped on every usage block
pub fn format_usage_time(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Usage block for an instance, zero-filling anything not reported
///
/// A sample without CPU comes from an overloaded metrics pipeline and its
/// other fields are not trusted: the whole block is zeroed.
pub fn usage_from_sample(sample: Option<&MetricSample>, time: &str) -> UsageStats {
    match sample {
        Some(MetricSample { cpu: Some(cpu), memory_bytes, disk_bytes, .. }) => UsageStats {
            time: time.to_string(),
            cpu: *cpu,
            mem: memory_bytes.unwrap_or(0),
            disk: disk_bytes.unwrap_or(0),
        },
        _ => UsageStats {
            time: time.to_string(),
            cpu: 0.0,
            mem: 0,
            disk: 0,
        },
    }
}
