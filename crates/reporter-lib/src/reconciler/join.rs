//! Per-index join of actual records and metric samples
//!
//! Pure: no logging, no clock reads. The caller passes in "now".

use crate::models::{
    ActualInstanceRecord, InstanceReport, InstanceState, InstanceStats, InstanceStatus,
    MetricSample, ProcessDescriptor,
};
use crate::normalize::{
    format_usage_time, host_port_for, mb_to_bytes, uptime_seconds, usage_from_sample,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Index each record by instance index. The first record seen for an index wins.
fn index_records(records: &[ActualInstanceRecord]) -> HashMap<u32, &ActualInstanceRecord> {
    let mut by_index = HashMap::with_capacity(records.len());
    for record in records {
        by_index.entry(record.index).or_insert(record);
    }
    by_index
}

fn index_samples(samples: &[MetricSample]) -> HashMap<u32, &MetricSample> {
    let mut by_index = HashMap::with_capacity(samples.len());
    for sample in samples {
        by_index.entry(sample.instance_index).or_insert(sample);
    }
    by_index
}

/// Build the report for every desired index of `process`
///
/// Records at or beyond the desired instance count are never visited.
pub fn build_report(
    process: &ProcessDescriptor,
    records: &[ActualInstanceRecord],
    isolation_segment: Option<&str>,
    samples: &[MetricSample],
    now: DateTime<Utc>,
    default_port: u32,
) -> InstanceReport {
    let records = index_records(records);
    let samples = index_samples(samples);
    let time = format_usage_time(now);

    (0..process.instances)
        .map(|index| {
            let status = match records.get(&index) {
                None => InstanceStatus::down(),
                Some(record) if record.state == InstanceState::Running => running_status(
                    process,
                    record,
                    isolation_segment,
                    samples.get(&index).copied(),
                    now,
                    &time,
                    default_port,
                ),
                Some(record) => InstanceStatus::with_state(record.state),
            };
            (index, status)
        })
        .collect()
}

fn running_status(
    process: &ProcessDescriptor,
    record: &ActualInstanceRecord,
    isolation_segment: Option<&str>,
    sample: Option<&MetricSample>,
    now: DateTime<Utc>,
    time: &str,
    default_port: u32,
) -> InstanceStatus {
    let net_info = record.net_info.clone().unwrap_or_default();

    let stats = InstanceStats {
        name: process.name.clone(),
        uris: process.uris.clone(),
        host: net_info.address.clone(),
        port: host_port_for(&net_info.ports, default_port),
        uptime: uptime_seconds(record.since, now),
        mem_quota: mb_to_bytes(process.memory_mb),
        disk_quota: mb_to_bytes(process.disk_mb),
        fds_quota: process.file_descriptors,
        usage: usage_from_sample(sample, time),
        net_info,
    };

    InstanceStatus {
        state: InstanceState::Running,
        isolation_segment: isolation_segment.map(str::to_string),
        stats: Some(stats),
        details: record.placement_error.clone(),
        uptime: None,
    }
}
