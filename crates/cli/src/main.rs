//! Instance Stats Reporter CLI
//!
//! A command-line tool that reconciles the desired and actual instances
//! of a process and prints per-instance state and resource usage.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Overrides, ReporterConfig};

/// Instance Stats Reporter CLI
#[derive(Parser)]
#[command(name = "isr")]
#[command(author, version, about = "CLI for the Instance Stats Reporter", long_about = None)]
pub struct Cli {
    /// Path to a config file (default: ~/.config/isr/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Actual-state registry URL
    #[arg(long, global = true)]
    pub runtime_state_url: Option<String>,

    /// Metrics service URL
    #[arg(long, global = true)]
    pub metrics_url: Option<String>,

    /// Auth token forwarded to the metrics service
    #[arg(long, global = true)]
    pub auth_token: Option<String>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show per-instance state and resource usage of a process
    Stats {
        /// JSON file describing the process
        process_file: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = ReporterConfig::load(cli.config.as_deref())?.apply(Overrides {
        runtime_state_url: cli.runtime_state_url,
        metrics_url: cli.metrics_url,
        auth_token: cli.auth_token,
    });

    match cli.command {
        Commands::Stats { process_file } => {
            commands::stats::show_stats(&config, &process_file, cli.format).await?;
        }
        Commands::Config => {
            commands::config::show_config(&config, cli.format)?;
        }
    }

    Ok(())
}
