//! Loading [`ClientConfig`](crate::config::ClientConfig) from files and the environment.
//!
//! File configuration is deserialized into the serde mirror [`FileConfig`] and
//! then converted into [`ClientConfig`](crate::config::ClientConfig) through the
//! builder API, so file and programmatic configuration share one validation path.
//!
//! # Supported Formats
//!
//! - `ClientConfig::from_yaml("client.yaml")` and `ClientConfig::from_toml("client.toml")`
//!   with the `config-file` feature
//! - `ClientConfig::from_env()`, always available
//!
//! # Example YAML
//!
//! ```yaml
//! cluster-name: production
//! allow-wide-integers: false
//! network:
//!   hosts:
//!     - "10.0.0.1:3000"
//!     - "db2.internal"
//!   connection-timeout-ms: 1000
//!   tend-interval-ms: 1000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, ClientConfigBuilder, ConfigError, Host};

/// Serde mirror of [`ClientConfig`]; absent fields keep builder defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileConfig {
    /// Expected cluster name.
    pub cluster_name: Option<String>,
    /// Whether positive 64-bit integers may be encoded.
    pub allow_wide_integers: Option<bool>,
    /// Seed hosts and timeouts.
    pub network: Option<FileNetworkConfig>,
}

/// Serde mirror of [`NetworkConfig`](crate::config::NetworkConfig).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileNetworkConfig {
    /// Seed hosts as `host` or `host:port`.
    pub hosts: Option<Vec<String>>,
    /// Connect and info-request timeout, in milliseconds.
    pub connection_timeout_ms: Option<u64>,
    /// Tend interval in milliseconds.
    pub tend_interval_ms: Option<u64>,
}

impl TryFrom<FileConfig> for ClientConfig {
    type Error = ConfigError;

    fn try_from(file: FileConfig) -> Result<Self, Self::Error> {
        let mut builder = ClientConfigBuilder::new();

        if let Some(name) = file.cluster_name {
            builder = builder.cluster_name(name);
        }

        if let Some(allow) = file.allow_wide_integers {
            builder = builder.allow_wide_integers(allow);
        }

        if let Some(net) = file.network {
            let hosts = net
                .hosts
                .unwrap_or_default()
                .iter()
                .map(|h| h.parse::<Host>())
                .collect::<Result<Vec<_>, _>>()?;

            builder = builder.network(|mut n| {
                n = n.hosts(hosts);
                if let Some(ms) = net.connection_timeout_ms {
                    n = n.connection_timeout(Duration::from_millis(ms));
                }
                if let Some(ms) = net.tend_interval_ms {
                    n = n.tend_interval(Duration::from_millis(ms));
                }
                n
            });
        }

        builder.build()
    }
}

impl ClientConfig {
    /// Reads a YAML file (`config-file` feature).
    #[cfg(feature = "config-file")]
    pub fn from_yaml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("failed to read YAML config file: {e}")))?;
        let file_config: FileConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("failed to parse YAML config: {e}")))?;
        file_config.try_into()
    }

    /// Reads a TOML file (`config-file` feature).
    #[cfg(feature = "config-file")]
    pub fn from_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("failed to read TOML config file: {e}")))?;
        let file_config: FileConfig = toml_crate::from_str(&content)
            .map_err(|e| ConfigError::new(format!("failed to parse TOML config: {e}")))?;
        file_config.try_into()
    }

    /// Builds a configuration from `AS_*` environment variables.
    ///
    /// | Variable | Maps to |
    /// |----------|---------|
    /// | `AS_HOSTS` | Comma-separated seed hosts (e.g., `10.0.0.1:3000,db2`) |
    /// | `AS_CLUSTER_NAME` | `cluster_name` |
    /// | `AS_CONNECTION_TIMEOUT_MS` | Connection timeout in milliseconds |
    /// | `AS_TEND_INTERVAL_MS` | Tend interval in milliseconds |
    /// | `AS_ALLOW_WIDE_INTEGERS` | `"true"` or `"false"` |
    ///
    /// Unparseable numeric values are ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        file_config_from_vars(|key| std::env::var(key).ok()).try_into()
    }
}

fn file_config_from_vars<F>(var: F) -> FileConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut file_config = FileConfig::default();

    if let Some(val) = var("AS_CLUSTER_NAME") {
        file_config.cluster_name = Some(val);
    }

    if let Some(val) = var("AS_HOSTS") {
        file_config.network.get_or_insert_with(Default::default).hosts = Some(
            val.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }

    if let Some(ms) = var("AS_CONNECTION_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
        file_config
            .network
            .get_or_insert_with(Default::default)
            .connection_timeout_ms = Some(ms);
    }

    if let Some(ms) = var("AS_TEND_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
        file_config
            .network
            .get_or_insert_with(Default::default)
            .tend_interval_ms = Some(ms);
    }

    if let Some(val) = var("AS_ALLOW_WIDE_INTEGERS") {
        file_config.allow_wide_integers = Some(val.eq_ignore_ascii_case("true"));
    }

    file_config
}

/// Loads a configuration file, choosing the format by extension.
///
/// Supports `.yaml`, `.yml`, and `.toml`. Requires the `config-file` feature.
#[cfg(feature = "config-file")]
pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => ClientConfig::from_yaml(path),
        Some("toml") => ClientConfig::from_toml(path),
        Some(ext) => Err(ConfigError::new(format!(
            "unsupported config file extension: .{ext} (expected .yaml, .yml, or .toml)"
        ))),
        None => Err(ConfigError::new(
            "config file has no extension; expected .yaml, .yml, or .toml",
        )),
    }
}
