//! Core data models for the instance stats reporter

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired-state description of a process, owned by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    pub guid: String,
    pub name: String,
    /// Desired instance count
    pub instances: u32,
    /// Declared memory limit in MB
    pub memory_mb: u64,
    /// Declared disk limit in MB
    pub disk_mb: u64,
    pub file_descriptors: u64,
    #[serde(default)]
    pub uris: Vec<String>,
    /// Revision of the process; part of the scheduling guid when present
    #[serde(default)]
    pub version: Option<String>,
}

impl ProcessDescriptor {
    /// Guid the scheduler indexes this process under
    pub fn scheduling_guid(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{}", self.guid, version),
            None => self.guid.clone(),
        }
    }
}

/// Lifecycle state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Unclaimed,
    Claimed,
    Running,
    Crashed,
    /// Desired but not reported by the actual-state registry
    Down,
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Unclaimed => "UNCLAIMED",
            InstanceState::Claimed => "CLAIMED",
            InstanceState::Running => "RUNNING",
            InstanceState::Crashed => "CRASHED",
            InstanceState::Down => "DOWN",
            InstanceState::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container to host port mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u32,
    #[serde(default)]
    pub host_port: u32,
}

/// Network placement of an actual instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
}

/// Instance record as reported by the actual-state registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualInstanceRecord {
    pub index: u32,
    pub instance_guid: String,
    pub state: InstanceState,
    #[serde(default)]
    pub placement_error: Option<String>,
    /// Nanoseconds since the Unix epoch at which `state` was entered
    pub since: i64,
    #[serde(default)]
    pub net_info: Option<NetInfo>,
}

/// Scheduling metadata for the whole process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesiredRuntimeDescriptor {
    #[serde(default)]
    pub placement_tags: Vec<String>,
}

/// Resource usage sample for one instance; any measurement may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub instance_index: u32,
    /// CPU utilization as a fraction of one core
    pub cpu: Option<f64>,
    pub memory_bytes: Option<u64>,
    pub disk_bytes: Option<u64>,
}

/// Usage block of a running instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub time: String,
    pub cpu: f64,
    pub mem: u64,
    pub disk: u64,
}

/// Stats block of a running instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceStats {
    pub name: String,
    pub uris: Vec<String>,
    pub host: String,
    pub port: u32,
    pub net_info: NetInfo,
    pub uptime: u64,
    pub mem_quota: u64,
    pub disk_quota: u64,
    pub fds_quota: u64,
    pub usage: UsageStats,
}

/// Reconciled status of one desired instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceStatus {
    pub state: InstanceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolation_segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<InstanceStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Only set on instances the registry did not report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
}

impl InstanceStatus {
    /// Placeholder for a desired index with no actual record
    pub fn down() -> Self {
        Self {
            state: InstanceState::Down,
            isolation_segment: None,
            stats: None,
            details: None,
            uptime: Some(0),
        }
    }

    /// Bare status of a non-running instance
    pub fn with_state(state: InstanceState) -> Self {
        Self {
            state,
            isolation_segment: None,
            stats: None,
            details: None,
            uptime: None,
        }
    }
}

/// Per-index report, keyed by instance index
pub type InstanceReport = BTreeMap<u32, InstanceStatus>;
