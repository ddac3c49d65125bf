//! Error types for the Zabbix client

use thiserror::Error;

/// Errors that can occur when talking to the Zabbix API
#[derive(Error, Debug)]
pub enum ZabbixError {
    /// HTTP transport failed (connect, TLS, timeout, body read)
    #[error("zabbix unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// `user.login` was rejected
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The API answered with a non-zero `error.code`
    #[error("{method} rejected (code {code}): {message}")]
    Rejected {
        /// JSON-RPC method name
        method: &'static str,
        /// Zabbix error code
        code: i64,
        /// Error message and data
        message: String,
    },

    /// The response could not be interpreted
    #[error("invalid response to {method}: {reason}")]
    Protocol {
        /// JSON-RPC method name
        method: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Request serialization failed
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid API URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ZabbixError>;
