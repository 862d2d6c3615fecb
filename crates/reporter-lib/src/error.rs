//! Error types for instance reconciliation

use thiserror::Error;

/// Downstream data needed for the report could not be obtained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("instances unavailable: {message}")]
pub struct InstancesUnavailable {
    message: String,
}

impl InstancesUnavailable {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message of the originating failure
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure returned by an upstream client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Already classified, e.g. by a nested reporter
    #[error(transparent)]
    Unavailable(#[from] InstancesUnavailable),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
