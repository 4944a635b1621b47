//! Client configuration types and builders.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use aerospike_core::value::{classify, Value, WireValue};
use aerospike_core::AerospikeError;

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default connection timeout, applied to each connect and info exchange.
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(1);
/// Default interval between partition refresh cycles.
const DEFAULT_TEND_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the validation message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for AerospikeError {
    fn from(err: ConfigError) -> Self {
        AerospikeError::Configuration(err.message)
    }
}

/// A seed host: a name to resolve plus the port every resolved address uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    /// Host name or IP literal.
    pub name: String,
    /// Service port.
    pub port: u16,
}

impl Host {
    /// Creates a host entry.
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.contains(':') {
            write!(f, "[{}]:{}", self.name, self.port)
        } else {
            write!(f, "{}:{}", self.name, self.port)
        }
    }
}

impl FromStr for Host {
    type Err = ConfigError;

    /// Parses `host`, `host:port`, `[v6]` or `[v6]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::new("host must not be empty"));
        }

        let (name, port) = if let Some(rest) = s.strip_prefix('[') {
            let (name, tail) = rest
                .split_once(']')
                .ok_or_else(|| ConfigError::new(format!("unterminated IPv6 host: {s}")))?;
            match tail.strip_prefix(':') {
                Some(port) => (name, Some(port)),
                None if tail.is_empty() => (name, None),
                None => return Err(ConfigError::new(format!("invalid host: {s}"))),
            }
        } else if s.matches(':').count() == 1 {
            let (name, port) = s.split_once(':').unwrap_or((s, ""));
            (name, Some(port))
        } else {
            (s, None)
        };

        if name.is_empty() {
            return Err(ConfigError::new(format!("host name missing in {s}")));
        }

        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| ConfigError::new(format!("invalid port in {s}: {e}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self::new(name, port))
    }
}

/// Network configuration for seed hosts and connection bounds.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    hosts: Vec<Host>,
    connection_timeout: Duration,
    tend_interval: Duration,
}

impl NetworkConfig {
    /// Returns the configured seed hosts.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Returns the timeout for opening a connection and for each info exchange.
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Returns the interval callers should wait between refresh cycles.
    pub fn tend_interval(&self) -> Duration {
        self.tend_interval
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hosts: vec![Host::default()],
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            tend_interval: DEFAULT_TEND_INTERVAL,
        }
    }
}

/// Builder for `NetworkConfig`.
#[derive(Debug, Clone, Default)]
pub struct NetworkConfigBuilder {
    hosts: Vec<Host>,
    connection_timeout: Option<Duration>,
    tend_interval: Option<Duration>,
}

impl NetworkConfigBuilder {
    /// Creates a new network configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a seed host.
    pub fn add_host(mut self, host: Host) -> Self {
        self.hosts.push(host);
        self
    }

    /// Sets the seed hosts, replacing any previously configured.
    pub fn hosts(mut self, hosts: impl IntoIterator<Item = Host>) -> Self {
        self.hosts = hosts.into_iter().collect();
        self
    }

    /// Sets the connection timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Sets the tend interval.
    pub fn tend_interval(mut self, interval: Duration) -> Self {
        self.tend_interval = Some(interval);
        self
    }

    /// Builds the network configuration.
    pub fn build(self) -> Result<NetworkConfig, ConfigError> {
        let hosts = if self.hosts.is_empty() {
            vec![Host::default()]
        } else {
            self.hosts
        };

        if let Some(host) = hosts.iter().find(|h| h.port == 0) {
            return Err(ConfigError::new(format!("port of host {} must be non-zero", host.name)));
        }

        let connection_timeout = self.connection_timeout.unwrap_or(DEFAULT_CONNECTION_TIMEOUT);
        if connection_timeout.is_zero() {
            return Err(ConfigError::new("connection_timeout must be non-zero"));
        }

        let tend_interval = self.tend_interval.unwrap_or(DEFAULT_TEND_INTERVAL);
        if tend_interval.is_zero() {
            return Err(ConfigError::new("tend_interval must be non-zero"));
        }

        Ok(NetworkConfig {
            hosts,
            connection_timeout,
            tend_interval,
        })
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    cluster_name: Option<String>,
    network: NetworkConfig,
    allow_wide_integers: bool,
}

impl ClientConfig {
    /// Creates a new client configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the expected cluster name, if one was configured.
    ///
    /// When set, seeding skips nodes that report a different cluster name.
    pub fn cluster_name(&self) -> Option<&str> {
        self.cluster_name.as_deref()
    }

    /// Returns the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Returns whether positive 64-bit integers may be encoded.
    pub fn allow_wide_integers(&self) -> bool {
        self.allow_wide_integers
    }

    /// Classifies a value using this configuration's integer width rule.
    pub fn classify(&self, value: &Value) -> aerospike_core::Result<WireValue> {
        classify(value, self.allow_wide_integers)
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    cluster_name: Option<String>,
    network: NetworkConfigBuilder,
    allow_wide_integers: bool,
}

impl ClientConfigBuilder {
    /// Creates a new client configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expected cluster name.
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Configures network settings using a builder function.
    pub fn network<F>(mut self, f: F) -> Self
    where
        F: FnOnce(NetworkConfigBuilder) -> NetworkConfigBuilder,
    {
        self.network = f(self.network);
        self
    }

    /// Adds a seed host.
    pub fn add_host(mut self, host: Host) -> Self {
        self.network = self.network.add_host(host);
        self
    }

    /// Sets the seed hosts.
    pub fn hosts(mut self, hosts: impl IntoIterator<Item = Host>) -> Self {
        self.network = self.network.hosts(hosts);
        self
    }

    /// Sets the connection timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.network = self.network.connection_timeout(timeout);
        self
    }

    /// Allows positive integers that need the full 64 bits.
    pub fn allow_wide_integers(mut self, allow: bool) -> Self {
        self.allow_wide_integers = allow;
        self
    }

    /// Builds the client configuration, returning an error if validation fails.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        if matches!(self.cluster_name.as_deref(), Some("")) {
            return Err(ConfigError::new("cluster_name must not be empty"));
        }

        let network = self.network.build()?;

        Ok(ClientConfig {
            cluster_name: self.cluster_name,
            network,
            allow_wide_integers: self.allow_wide_integers,
        })
    }
}
