//! Node identity discovery for seed hosts.

use std::sync::Arc;
use std::time::Duration;

use aerospike_core::{AerospikeError, Result};

use super::node::NodeIdentity;
use super::version::BuildVersion;
use crate::config::Host;
use crate::connection::{Connection, HostResolver};

/// Info key holding the node name.
pub const NODE_KEY: &str = "node";
/// Info key holding the server build string.
pub const BUILD_KEY: &str = "build";
/// Info key holding the name of the cluster a node belongs to.
pub const CLUSTER_NAME_KEY: &str = "cluster-name";

/// Resolves seed hosts and asks each alias who it is.
#[derive(Debug, Clone)]
pub struct NodeValidator {
    resolver: Arc<dyn HostResolver>,
    timeout: Duration,
    cluster_name: Option<String>,
}

impl NodeValidator {
    /// Creates a validator that bounds every connect and info exchange by `timeout`.
    pub fn new(resolver: Arc<dyn HostResolver>, timeout: Duration) -> Self {
        Self {
            resolver,
            timeout,
            cluster_name: None,
        }
    }

    /// Only accepts nodes that report `name` under [`CLUSTER_NAME_KEY`].
    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Returns the per-step timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bootstraps `host`.
    ///
    /// Every alias is tried in resolution order. Aliases that cannot be
    /// reached, or whose info exchange fails, are skipped; the last alias that
    /// reports a name wins. A build string that cannot be parsed aborts the
    /// whole bootstrap with a parse error. When a cluster name is set, aliases
    /// reporting a different (or no) cluster name are skipped. The returned
    /// identity has no name if no alias answered.
    pub async fn bootstrap(&self, host: &Host) -> Result<NodeIdentity> {
        let aliases = self.resolver.resolve(host).await?;
        let mut identity = NodeIdentity {
            aliases: aliases.clone(),
            ..Default::default()
        };

        for alias in aliases {
            let mut conn = match Connection::connect(alias, self.timeout).await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::debug!(host = %host, alias = %alias, error = %e, "skipping unreachable alias");
                    continue;
                }
            };

            let keys: &[&str] = if self.cluster_name.is_some() {
                &[NODE_KEY, BUILD_KEY, CLUSTER_NAME_KEY]
            } else {
                &[NODE_KEY, BUILD_KEY]
            };
            let result = conn.request_info(keys).await;
            conn.close().await?;

            let mut response = match result {
                Ok(response) => response,
                Err(e) if is_transport_error(&e) => {
                    tracing::debug!(host = %host, alias = %alias, error = %e, "skipping alias after failed info request");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(expected) = self.cluster_name.as_deref() {
                let actual = response.get(CLUSTER_NAME_KEY);
                if actual != Some(expected) {
                    tracing::warn!(
                        host = %host,
                        alias = %alias,
                        expected = expected,
                        actual = ?actual,
                        "skipping node from another cluster"
                    );
                    continue;
                }
            }

            let Some(name) = response.take(NODE_KEY).filter(|n| !n.is_empty()) else {
                continue;
            };

            let build = response.get(BUILD_KEY).map(BuildVersion::parse).transpose()?;
            identity.supports_new_info = build.map_or(false, |v| v.supports_new_info());
            identity.build = build;

            tracing::debug!(
                host = %host,
                alias = %alias,
                name = %name,
                supports_new_info = identity.supports_new_info,
                "discovered node identity"
            );
            identity.name = Some(name);
            identity.address = Some(alias);
        }

        Ok(identity)
    }
}

fn is_transport_error(err: &AerospikeError) -> bool {
    matches!(
        err,
        AerospikeError::Connection(_) | AerospikeError::Timeout(_) | AerospikeError::Io(_)
    )
}
