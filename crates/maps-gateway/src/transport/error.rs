//! Transport layer errors

use std::time::Duration;

use thiserror::Error;

/// Failure to obtain any response from the upstream.
///
/// Messages never include the request URL, since the query string carries
/// the credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to read response body: {0}")]
    BodyFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
