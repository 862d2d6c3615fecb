//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use reporter_lib::InstanceState;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format a CPU fraction as a percentage
pub fn format_cpu(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Format uptime seconds as e.g. "2d3h", "4h12m", "35s"
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{}d{}h", days, hours)
    } else if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Color an instance state
pub fn color_state(state: InstanceState) -> String {
    let label = state.as_str();
    match state {
        InstanceState::Running => label.green().to_string(),
        InstanceState::Unclaimed | InstanceState::Claimed => label.yellow().to_string(),
        InstanceState::Crashed | InstanceState::Down => label.red().to_string(),
        InstanceState::Unknown => label.to_string(),
    }
}
