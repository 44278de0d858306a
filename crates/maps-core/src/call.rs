//! Outbound call assembly

use std::fmt;

use url::Url;

use crate::operation::{OperationSpec, ValidatedParams};

/// Query-parameter name the upstream expects the credential under
pub const CREDENTIAL_QUERY_KEY: &str = "key";

/// Server-held upstream credential.
///
/// Never printed: `Debug` and `Display` both render as `***`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty or whitespace-only key
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Append `path` to `base`, keeping any path `base` already has.
///
/// `https://host/maps/api` + `/geocode/json` gives `https://host/maps/api/geocode/json`.
pub fn resolve_url(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
    }
    url
}

/// One fully assembled upstream request.
///
/// Built by the dispatcher for a single invocation and consumed by the
/// transport. `url` carries no query string; the credential only lives in
/// `query`, as its last pair.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamCall {
    pub operation: &'static str,
    pub url: Url,
    pub query: Vec<(String, String)>,
}

impl UpstreamCall {
    pub fn assemble(
        base_url: &Url,
        spec: &OperationSpec,
        validated: &ValidatedParams,
        api_key: &ApiKey,
    ) -> Self {
        let mut query = spec.query_pairs(validated);
        query.push((CREDENTIAL_QUERY_KEY.to_string(), api_key.expose().to_string()));

        Self {
            operation: spec.name,
            url: resolve_url(base_url, spec.upstream_path),
            query,
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_query_key(&self, key: &str) -> bool {
        self.query.iter().any(|(k, _)| k == key)
    }

    /// Query keys in emission order
    pub fn query_keys(&self) -> Vec<&str> {
        self.query.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Full URL with the credential masked, for logging
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.query {
                if k == CREDENTIAL_QUERY_KEY {
                    pairs.append_pair(k, "***");
                } else {
                    pairs.append_pair(k, v);
                }
            }
        }
        url.to_string()
    }
}

impl fmt::Debug for UpstreamCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCall")
            .field("operation", &self.operation)
            .field("url", &self.redacted_url())
            .finish()
    }
}
