//! Transport layer for upstream calls
//!
//! The dispatcher talks to the upstream only through [`UpstreamTransport`],
//! which is also the interception point for tests:
//! - [`HttpTransport`] issues real HTTP GETs with reqwest
//! - [`MockTransport`] records every call and replays scripted responses

pub mod error;
pub mod http;
pub mod mock;

pub use error::TransportError;
pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport};

use async_trait::async_trait;
use bytes::Bytes;
use maps_core::UpstreamCall;
use reqwest::StatusCode;

/// Raw upstream answer, before any interpretation
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues a single upstream GET.
///
/// Implementations make exactly one attempt per call: no retries, no caching.
/// Any HTTP status is returned as a response; only failures to get a response
/// at all are errors.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(&self, call: &UpstreamCall) -> Result<UpstreamResponse, TransportError>;
}
