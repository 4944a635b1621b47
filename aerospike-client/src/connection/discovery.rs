//! Resolution of seed hosts into socket addresses.

use std::net::SocketAddr;

use aerospike_core::{AerospikeError, Result};
use async_trait::async_trait;

use crate::config::Host;

/// Resolves a seed host into the addresses (aliases) it is reachable at.
#[async_trait]
pub trait HostResolver: Send + Sync + std::fmt::Debug {
    /// Resolves `host`. Every returned address carries `host.port`.
    ///
    /// An empty list is a valid result.
    async fn resolve(&self, host: &Host) -> Result<Vec<SocketAddr>>;
}

/// Resolver backed by the system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, host: &Host) -> Result<Vec<SocketAddr>> {
        let addresses = tokio::net::lookup_host((host.name.as_str(), host.port))
            .await
            .map_err(|e| {
                AerospikeError::Connection(format!("failed to resolve {}: {}", host, e))
            })?
            .map(|addr| SocketAddr::new(addr.ip(), host.port))
            .collect::<Vec<_>>();

        tracing::trace!(host = %host, count = addresses.len(), "resolved host");
        Ok(addresses)
    }
}

/// Resolver that returns a fixed address list for every host.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    addresses: Vec<SocketAddr>,
}

impl StaticResolver {
    /// Creates a resolver over the given addresses.
    pub fn new(addresses: Vec<SocketAddr>) -> Self {
        Self { addresses }
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, _host: &Host) -> Result<Vec<SocketAddr>> {
        Ok(self.addresses.clone())
    }
}

impl From<Vec<SocketAddr>> for StaticResolver {
    fn from(addresses: Vec<SocketAddr>) -> Self {
        Self::new(addresses)
    }
}

impl<const N: usize> From<[SocketAddr; N]> for StaticResolver {
    fn from(addresses: [SocketAddr; N]) -> Self {
        Self::new(addresses.to_vec())
    }
}
