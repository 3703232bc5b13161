//! Client configuration

use doclassify_core::{Error, RequestParams, Result, DEFAULT_THRESHOLD, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Inference endpoint that accepts classification requests
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Health endpoint; derived from `endpoint` when unset
    #[serde(default)]
    pub health_endpoint: Option<String>,

    /// TCP connect timeout
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Upper bound on a whole request round trip
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Ranked labels to request
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Abstention threshold
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

/// Values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub top_k: Option<usize>,
    pub threshold: Option<f32>,
    pub request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Load configuration from file and apply overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let path = config_path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(endpoint) = &overrides.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(top_k) = overrides.top_k {
            config.top_k = top_k;
        }
        if let Some(threshold) = overrides.threshold {
            config.threshold = threshold;
        }
        if let Some(timeout) = overrides.request_timeout_ms {
            config.request_timeout_ms = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that endpoints parse and parameters are in range
    pub fn validate(&self) -> Result<()> {
        self.endpoint_url()?;
        self.health_url()?;
        self.params()?;
        if self.request_timeout_ms == 0 {
            return Err(Error::config("request_timeout_ms must be positive"));
        }
        Ok(())
    }

    /// Default request parameters
    pub fn params(&self) -> Result<RequestParams> {
        RequestParams::new(self.top_k, self.threshold)
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint)
            .map_err(|e| Error::config(format!("invalid endpoint '{}': {e}", self.endpoint)))
    }

    /// Health URL: explicit value, or `/health` on the endpoint's origin
    pub fn health_url(&self) -> Result<Url> {
        match &self.health_endpoint {
            Some(raw) => Url::parse(raw)
                .map_err(|e| Error::config(format!("invalid health endpoint '{raw}': {e}"))),
            None => self
                .endpoint_url()?
                .join("/health")
                .map_err(|e| Error::config(format!("cannot derive health endpoint: {e}"))),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            health_endpoint: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            top_k: default_top_k(),
            threshold: default_threshold(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8000/predict".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}
