//! Core error types for scalesync-core

use thiserror::Error;

/// Errors that can occur in reconciler operations
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Continuing could unmonitor hosts that are still alive
    #[error("fatal: {0}")]
    Fatal(String),

    /// Monitoring API call failed
    #[error("monitoring API error: {0}")]
    Monitoring(String),

    /// Initial sync requested without a fleet client
    #[error("fleet query is not configured")]
    FleetNotConfigured,

    /// Actor communication error
    #[error("actor communication error: {0}")]
    ActorError(String),
}

impl CoreError {
    /// Check if the process must stop
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Fatal(_))
    }
}
