//! Per-instance stats command

use anyhow::{Context, Result};
use colored::Colorize;
use reporter_lib::upstream::{HttpMetricsClient, HttpRuntimeStateClient};
use reporter_lib::{
    InstanceReconcilerBuilder, InstanceReport, InstanceStatus, ProcessDescriptor, StaticToken,
};
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;
use tracing::debug;

use crate::config::ReporterConfig;
use crate::output::{
    color_state, format_bytes, format_cpu, format_uptime, print_warning, OutputFormat,
};

/// Row for the instances table
#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Index")]
    index: u32,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Disk")]
    disk: String,
    #[tabled(rename = "Segment")]
    segment: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl InstanceRow {
    fn new(index: u32, status: &InstanceStatus) -> Self {
        let segment = status.isolation_segment.clone().unwrap_or_else(|| "-".to_string());
        let details = status.details.clone().unwrap_or_else(|| "-".to_string());

        match &status.stats {
            Some(stats) => Self {
                index,
                state: color_state(status.state),
                address: format!("{}:{}", stats.host, stats.port),
                uptime: format_uptime(stats.uptime),
                cpu: format_cpu(stats.usage.cpu),
                memory: format!(
                    "{} / {}",
                    format_bytes(stats.usage.mem),
                    format_bytes(stats.mem_quota)
                ),
                disk: format!(
                    "{} / {}",
                    format_bytes(stats.usage.disk),
                    format_bytes(stats.disk_quota)
                ),
                segment,
                details,
            },
            None => Self {
                index,
                state: color_state(status.state),
                address: "-".to_string(),
                uptime: status
                    .uptime
                    .map(format_uptime)
                    .unwrap_or_else(|| "-".to_string()),
                cpu: "-".to_string(),
                memory: "-".to_string(),
                disk: "-".to_string(),
                segment,
                details,
            },
        }
    }
}

/// Read a process descriptor from a JSON file
pub fn load_process(path: &Path) -> Result<ProcessDescriptor> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read process descriptor {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse process descriptor {:?}", path))
}

/// Fetch and print the per-instance report for a process
pub async fn show_stats(
    config: &ReporterConfig,
    process_file: &Path,
    format: OutputFormat,
) -> Result<()> {
    let process = load_process(process_file)?;

    let runtime_state = HttpRuntimeStateClient::new(&config.runtime_state_client())?;
    let metrics_client = HttpMetricsClient::new(&config.metrics_client())?;
    debug!(
        runtime_state = %runtime_state.endpoint(),
        metrics = %metrics_client.endpoint(),
        "Using upstream endpoints"
    );

    let reconciler = InstanceReconcilerBuilder::new()
        .runtime_state(Arc::new(runtime_state))
        .metrics_client(Arc::new(metrics_client))
        .token_provider(Arc::new(StaticToken::new(config.auth_token.clone())))
        .default_port(config.default_port)
        .build()?;

    let report = reconciler.stats_for_process(&process).await?;
    print_report(&process, &report, format)
}

fn print_report(
    process: &ProcessDescriptor,
    report: &InstanceReport,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!("{}", "Instance Stats".bold());
            println!("{}", "=".repeat(60));
            println!("Process:   {} ({})", process.name.cyan(), process.guid);
            println!("Desired:   {}", process.instances);
            if !process.uris.is_empty() {
                println!("Routes:    {}", process.uris.join(", "));
            }
            println!();

            if report.is_empty() {
                print_warning("Process has no desired instances");
                return Ok(());
            }

            let rows: Vec<InstanceRow> = report
                .iter()
                .map(|(index, status)| InstanceRow::new(*index, status))
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
