//! reqwest-backed upstream transport

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use maps_core::UpstreamCall;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{TransportError, UpstreamResponse, UpstreamTransport};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upstream transport over a pooled reqwest client.
///
/// The client is shared by all concurrent invocations.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_config(timeout: Duration, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("maps-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::InvalidConfig(error_chain(&e.without_url())))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        let err = err.without_url();
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::ConnectionFailed(error_chain(&err))
        } else if err.is_body() || err.is_decode() {
            TransportError::BodyFailed(error_chain(&err))
        } else {
            TransportError::RequestFailed(error_chain(&err))
        }
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    #[instrument(skip_all, fields(operation = call.operation))]
    async fn get(&self, call: &UpstreamCall) -> Result<UpstreamResponse, TransportError> {
        let started = Instant::now();

        let response = self
            .client
            .get(call.url.clone())
            .query(&call.query)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        debug!(
            status = %status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream responded"
        );

        Ok(UpstreamResponse { status, body })
    }
}

/// Error message including its sources ("a: b: c")
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
