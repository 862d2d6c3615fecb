//! Show the effective configuration

use anyhow::Result;
use colored::Colorize;

use crate::config::ReporterConfig;
use crate::output::OutputFormat;

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        "(unset)".to_string()
    } else {
        "****".to_string()
    }
}

pub fn show_config(config: &ReporterConfig, format: OutputFormat) -> Result<()> {
    let mut masked = config.clone();
    masked.auth_token = mask_token(&config.auth_token);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&masked)?);
        }
        OutputFormat::Table => {
            println!("{}", "Configuration".bold());
            println!("{}", "=".repeat(50));
            println!("Runtime State URL:      {}", masked.runtime_state_url.cyan());
            println!("Metrics URL:            {}", masked.metrics_url.cyan());
            println!("Auth Token:             {}", masked.auth_token);
            println!("Connect Timeout:        {}s", masked.connect_timeout_secs);
            println!("Request Timeout:        {}s", masked.request_timeout_secs);
            println!("Default Port:           {}", masked.default_port);
        }
    }

    Ok(())
}
