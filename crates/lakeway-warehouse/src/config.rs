//! Configuration for the warehouse session

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{WarehouseError, WarehouseResult};

/// Configuration for a warehouse connection
#[derive(Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Logical name for this warehouse, used in logs
    #[serde(default = "default_name")]
    pub name: String,

    /// Workspace host, with or without an `https://` prefix
    pub host: String,

    /// Bearer token forwarded to the engine; validated upstream, never here
    pub access_token: String,

    /// SQL warehouse id for the warehouse endpoint path
    #[serde(default)]
    pub warehouse_id: Option<String>,

    /// Cluster id for the protocol endpoint path
    #[serde(default)]
    pub cluster_id: Option<String>,

    /// Endpoint id for the legacy endpoint path
    #[serde(default)]
    pub endpoint_id: Option<String>,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl WarehouseConfig {
    /// Load configuration from `WAREHOUSE_*` environment variables
    pub fn from_env() -> WarehouseResult<Self> {
        let host = require_env("WAREHOUSE_HOST")?;
        let access_token = require_env("WAREHOUSE_ACCESS_TOKEN")?;

        let config = Self {
            name: default_name(),
            host,
            access_token,
            warehouse_id: optional_env("WAREHOUSE_WAREHOUSE_ID"),
            cluster_id: optional_env("WAREHOUSE_CLUSTER_ID"),
            endpoint_id: optional_env("WAREHOUSE_ENDPOINT_ID"),
            retry: RetryConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate host and credential presence
    pub fn validate(&self) -> WarehouseResult<()> {
        if self.access_token.is_empty() {
            return Err(WarehouseError::InvalidConfig(
                "access token is empty".to_string(),
            ));
        }

        let url = url::Url::parse(&format!("https://{}", self.server_hostname()))?;
        if url.host_str().is_none() {
            return Err(WarehouseError::InvalidConfig(format!(
                "missing host in: {}",
                self.host
            )));
        }

        Ok(())
    }

    /// Hostname with any scheme prefix stripped
    pub fn server_hostname(&self) -> &str {
        let host = self.host.trim();
        let host = host.strip_prefix("https://").unwrap_or(host);
        host.strip_prefix("http://").unwrap_or(host)
    }

    /// Workspace id derived from the hostname
    ///
    /// Hosts look like `adb-<workspace_id>.<n>.azuredatabricks.net`; the id
    /// is the first dot-segment with the `adb-` prefix stripped.
    pub fn workspace_id(&self) -> String {
        let hostname = self.server_hostname();
        let first = hostname.split('.').next().unwrap_or(hostname);
        first.strip_prefix("adb-").unwrap_or(first).to_string()
    }
}

// Manual Debug so the access token never reaches logs
impl std::fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("access_token", &"<redacted>")
            .field("warehouse_id", &self.warehouse_id)
            .field("cluster_id", &self.cluster_id)
            .field("endpoint_id", &self.endpoint_id)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Retry configuration for statement execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of execution attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff duration in seconds, doubled after each failed attempt
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

impl RetryConfig {
    /// Get the base backoff as Duration
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

fn require_env(key: &str) -> WarehouseResult<String> {
    std::env::var(key)
        .map_err(|_| WarehouseError::InvalidConfig(format!("{} is not set", key)))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn default_name() -> String {
    "warehouse".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    2
}
