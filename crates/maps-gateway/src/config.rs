//! Upstream configuration

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use maps_core::ApiKey;

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid {field}: must be greater than zero")]
    InvalidTimeout { field: &'static str },

    #[error("Upstream API key not configured (set GOOGLE_MAPS_API_KEY or [upstream].api_key)")]
    MissingApiKey,
}

/// `[upstream]` section of the daemon config
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Usually left unset in files and supplied through the environment
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl UpstreamConfig {
    /// Parsed base URL; must be an absolute http(s) URL
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if url.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "timeout_secs",
            });
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }

    pub fn connect_timeout(&self) -> Result<Duration, ConfigError> {
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "connect_timeout_secs",
            });
        }
        Ok(Duration::from_secs(self.connect_timeout_secs))
    }

    /// Resolve the credential, preferring `env_value` over the file value
    pub fn api_key(&self, env_value: Option<&str>) -> Result<ApiKey, ConfigError> {
        env_value
            .and_then(ApiKey::new)
            .or_else(|| self.api_key.as_deref().and_then(ApiKey::new))
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url().unwrap().as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(10));
        assert_eq!(config.connect_timeout().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = UpstreamConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let config = UpstreamConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = UpstreamConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.timeout(),
            Err(ConfigError::InvalidTimeout {
                field: "timeout_secs"
            })
        ));
    }

    #[test]
    fn test_api_key_precedence() {
        let config = UpstreamConfig {
            api_key: Some("from-file".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_key(Some("from-env")).unwrap().expose(), "from-env");
        assert_eq!(config.api_key(Some("  ")).unwrap().expose(), "from-file");
        assert_eq!(config.api_key(None).unwrap().expose(), "from-file");

        let empty = UpstreamConfig::default();
        assert!(matches!(empty.api_key(None), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = UpstreamConfig {
            api_key: Some("secret-key".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
