//! Gateway dispatcher - one validated invocation, one upstream call

use std::sync::Arc;

use maps_core::{
    ApiKey, GatewayError, GatewayResult, OperationSpec, RequestParams, UpstreamCall,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{ConfigError, UpstreamConfig};
use crate::transport::{HttpTransport, TransportError, UpstreamTransport};

/// Forwards validated operation invocations to the upstream.
///
/// Holds no per-request state: the transport, base URL and credential are
/// fixed at construction, so a single dispatcher can serve any number of
/// concurrent callers.
pub struct Dispatcher {
    transport: Arc<dyn UpstreamTransport>,
    base_url: Url,
    api_key: ApiKey,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn UpstreamTransport>, base_url: Url, api_key: ApiKey) -> Self {
        Self {
            transport,
            base_url,
            api_key,
        }
    }

    /// Build a dispatcher with an [`HttpTransport`] from config
    pub fn from_config(config: &UpstreamConfig, api_key: ApiKey) -> Result<Self, DispatcherError> {
        let base_url = config.base_url()?;
        let transport = HttpTransport::with_config(config.timeout()?, config.connect_timeout()?)?;
        Ok(Self::new(Arc::new(transport), base_url, api_key))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Validate `params`, call the upstream once, and relay its JSON body.
    ///
    /// Validation failures return before any network activity. The body of a
    /// 2xx response is passed through untouched, whatever its own `status`
    /// field says.
    #[instrument(skip_all, fields(operation = spec.name))]
    pub async fn execute(&self, spec: &OperationSpec, params: &RequestParams) -> GatewayResult {
        let validated = spec.validate(params).map_err(|e| {
            debug!(fields = ?e.fields().collect::<Vec<_>>(), "Rejected invalid parameters");
            e
        })?;

        let call = UpstreamCall::assemble(&self.base_url, spec, &validated, &self.api_key);
        debug!(url = %call.redacted_url(), "Forwarding to upstream");

        let response = self
            .transport
            .get(&call)
            .await
            .map_err(|e| unavailable(spec, &e))?;

        if !response.status.is_success() {
            warn!(status = %response.status, "Upstream returned non-success status");
            return Err(GatewayError::UpstreamUnavailable {
                context: spec.error_message,
                message: format!("Upstream responded with HTTP {}", response.status),
            });
        }

        let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
            warn!(error = %e, "Upstream body is not valid JSON");
            GatewayError::MalformedUpstreamResponse {
                context: spec.error_message,
                message: format!("Upstream response is not valid JSON: {}", e),
            }
        })?;

        if let Some(status) = body.get("status").and_then(Value::as_str) {
            debug!(upstream_status = status, "Relaying upstream response");
        }

        Ok(body)
    }
}

fn unavailable(spec: &OperationSpec, err: &TransportError) -> GatewayError {
    warn!(error = %err, "Upstream call failed");
    GatewayError::UpstreamUnavailable {
        context: spec.error_message,
        message: err.to_string(),
    }
}

/// Errors building a [`Dispatcher`] from config
#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
