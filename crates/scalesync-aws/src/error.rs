//! Error types for scalesync-aws

use thiserror::Error;

/// Errors that can occur while querying fleet membership
///
/// Every variant means the membership is unknown.
#[derive(Error, Debug)]
pub enum FleetError {
    /// HTTP transport failed
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid endpoint URL
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// Non-success HTTP status without an API error body
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Leading part of the response body
        body: String,
    },

    /// Response body is not the expected JSON
    #[error("decoding response failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API returned an `Error` object
    #[error("API error '{code}': {message}")]
    Api {
        /// Error code, e.g. `SignatureDoesNotMatch`
        code: String,
        /// Error message
        message: String,
    },

    /// No group information in an otherwise successful answer
    #[error("no auto scaling group named '{0}' in response")]
    NoGroup(String),

    /// The group exists but lists no instances
    #[error("auto scaling group '{0}' has no instances")]
    NoInstances(String),
}

/// Result type for fleet queries
pub type Result<T> = std::result::Result<T, FleetError>;
