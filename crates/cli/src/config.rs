//! Configuration management for the CLI
//!
//! Sources, lowest precedence first: config file, `ISR_*` environment
//! variables, command-line flags.

use anyhow::{Context, Result};
use reporter_lib::upstream::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Reporter CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Actual-state registry endpoint
    #[serde(default = "default_runtime_state_url")]
    pub runtime_state_url: String,

    /// Metrics aggregation service endpoint
    #[serde(default = "default_metrics_url")]
    pub metrics_url: String,

    /// Token forwarded to the metrics service
    #[serde(default)]
    pub auth_token: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Container port whose host mapping is reported
    #[serde(default = "default_port")]
    pub default_port: u32,
}

fn default_runtime_state_url() -> String {
    "http://localhost:8889".to_string()
}

fn default_metrics_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_port() -> u32 {
    reporter_lib::normalize::DEFAULT_CONTAINER_PORT
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            runtime_state_url: default_runtime_state_url(),
            metrics_url: default_metrics_url(),
            auth_token: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            default_port: default_port(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub runtime_state_url: Option<String>,
    pub metrics_url: Option<String>,
    pub auth_token: Option<String>,
}

impl ReporterConfig {
    /// Load configuration from file and environment
    ///
    /// An explicitly given file must exist; the default one is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit_path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        let config = config::Config::builder()
            .add_source(config::File::from(path.clone()).required(required))
            .add_source(config::Environment::with_prefix("ISR"))
            .build()
            .with_context(|| format!("Failed to read configuration from {:?}", path))?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Apply command-line overrides
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.runtime_state_url {
            self.runtime_state_url = url;
        }
        if let Some(url) = overrides.metrics_url {
            self.metrics_url = url;
        }
        if let Some(token) = overrides.auth_token {
            self.auth_token = token;
        }
        self
    }

    pub fn runtime_state_client(&self) -> ClientConfig {
        self.client_config(&self.runtime_state_url)
    }

    pub fn metrics_client(&self) -> ClientConfig {
        self.client_config(&self.metrics_url)
    }

    fn client_config(&self, endpoint: &str) -> ClientConfig {
        ClientConfig {
            endpoint: endpoint.to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Get the default configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("isr").join("config.toml"))
    }
}
