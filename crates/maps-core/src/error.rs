//! Error types for gateway invocations

use std::fmt;

use thiserror::Error;

/// Result type for a single gateway invocation
pub type GatewayResult<T = serde_json::Value> = Result<T, GatewayError>;

/// A single invalid or missing field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Caller-facing field name (e.g. "place_id")
    pub field: String,
    /// Human-readable message (e.g. "The place_id field is required.")
    pub message: String,
}

impl FieldError {
    pub fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("The {} field is required.", field),
        }
    }

    pub fn invalid(field: &str, expected: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("The {} field must be {}.", field, expected),
        }
    }
}

/// Caller input was missing or malformed.
///
/// Holds every failing field, in the order the operation declares them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the failing fields
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    /// First message, followed by a count of the remaining ones.
    pub fn summary(&self) -> String {
        match self.errors.split_first() {
            None => "The given data was invalid.".to_string(),
            Some((first, [])) => first.message.clone(),
            Some((first, [_])) => format!("{} (and 1 more error)", first.message),
            Some((first, rest)) => format!("{} (and {} more errors)", first.message, rest.len()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationError {}

/// Coarse classification of a [`GatewayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    UpstreamUnavailable,
    MalformedUpstreamResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_failed",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::MalformedUpstreamResponse => "malformed_upstream_response",
        }
    }
}

/// Errors produced by a gateway invocation.
///
/// Every error is request-scoped; none of them affects later invocations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller input failed the operation's schema. No upstream call was made.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The upstream could not be reached, timed out, or answered non-2xx
    #[error("{context}: {message}")]
    UpstreamUnavailable {
        /// Fixed per-operation text (e.g. "Unable to geocode address")
        context: &'static str,
        /// Underlying transport error text
        message: String,
    },

    /// The upstream answered 2xx with a body that is not JSON
    #[error("{context}: {message}")]
    MalformedUpstreamResponse {
        context: &'static str,
        message: String,
    },
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) => ErrorKind::Validation,
            GatewayError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            GatewayError::MalformedUpstreamResponse { .. } => ErrorKind::MalformedUpstreamResponse,
        }
    }

    /// The fixed per-operation error text, for upstream-side failures
    pub fn context(&self) -> Option<&'static str> {
        match self {
            GatewayError::Validation(_) => None,
            GatewayError::UpstreamUnavailable { context, .. }
            | GatewayError::MalformedUpstreamResponse { context, .. } => Some(context),
        }
    }
}
