//! Gateway configuration loaded from `HISTKV_*` environment variables

use anyhow::Result;
use histkv_core::ResamplePolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::response::SeriesFormat;

/// Configuration for the query gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to
    pub bind_address: String,

    /// Prefix all read routes are mounted under (empty for root)
    pub path_prefix: String,

    /// Layout of series results
    pub series_format: SeriesFormat,

    /// Store backend configuration
    pub store: StoreConfig,

    /// Metrics and monitoring configuration
    pub metrics: MetricsConfig,
}

/// Store backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Representative selection for interval reads
    pub resample_policy: ResamplePolicy,

    /// JSON snapshot to load into the in-memory store at startup
    pub seed_file: Option<PathBuf>,
}

/// Metrics and monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint
    pub enable_prometheus: bool,

    /// Metrics endpoint path
    pub metrics_path: String,

    /// Health endpoint path
    pub health_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            path_prefix: String::new(),
            series_format: SeriesFormat::default(),
            store: StoreConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enable_prometheus: true,
            metrics_path: "/-/metrics".to_string(),
            health_path: "/-/healthy".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables and defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Override with environment variables if present
        if let Ok(bind_addr) = env::var("HISTKV_BIND_ADDRESS") {
            config.bind_address = bind_addr;
        }

        if let Ok(prefix) = env::var("HISTKV_PATH_PREFIX") {
            config.path_prefix = prefix;
        }

        if let Ok(format) = env::var("HISTKV_SERIES_FORMAT") {
            config.series_format = format.parse()?;
        }

        if let Ok(policy) = env::var("HISTKV_RESAMPLE_POLICY") {
            config.store.resample_policy = policy.parse()?;
        }

        if let Ok(seed_file) = env::var("HISTKV_SEED_FILE") {
            config.store.seed_file = Some(PathBuf::from(seed_file));
        }

        if let Ok(enable) = env::var("HISTKV_METRICS_ENABLE") {
            config.metrics.enable_prometheus = enable.parse()?;
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.is_empty() {
            return Err(anyhow::anyhow!("Bind address cannot be empty"));
        }

        if !self.path_prefix.is_empty() {
            if !self.path_prefix.starts_with('/') {
                return Err(anyhow::anyhow!(
                    "Path prefix must start with '/': {}",
                    self.path_prefix
                ));
            }
            if self.path_prefix.ends_with('/') {
                return Err(anyhow::anyhow!(
                    "Path prefix must not end with '/': {}",
                    self.path_prefix
                ));
            }
        }

        for path in [&self.metrics.metrics_path, &self.metrics.health_path] {
            if !path.starts_with('/') {
                return Err(anyhow::anyhow!("Endpoint path must start with '/': {}", path));
            }
        }

        if self.metrics.metrics_path == self.metrics.health_path {
            return Err(anyhow::anyhow!(
                "Metrics and health endpoints cannot share a path"
            ));
        }

        Ok(())
    }
}
