//! Seeding and partition refresh for a cluster of nodes.

use std::collections::HashMap;
use std::sync::Arc;

use aerospike_core::{AerospikeError, Result};
use tokio::sync::{Mutex, RwLock};

use super::bootstrap::NodeValidator;
use super::node::Node;
use super::partition::{parse_partition_bitmap, parse_partitions, Partition, DIGEST_SIZE};
use super::partition_map::{PartitionMap, PartitionTable};
use crate::config::ClientConfig;
use crate::connection::{Connection, DnsResolver, HostResolver};

/// Known nodes of a cluster and the partition table they populate.
///
/// This service performs single steps; callers that want continuous tending
/// call [`Cluster::tend_once`] every
/// [`tend_interval`](crate::config::NetworkConfig::tend_interval).
#[derive(Debug)]
pub struct Cluster {
    config: ClientConfig,
    validator: NodeValidator,
    nodes: RwLock<HashMap<String, Arc<Node>>>,
    partitions: PartitionTable,
    tend_lock: Mutex<()>,
}

impl Cluster {
    /// Creates a cluster that resolves seed hosts through DNS.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_resolver(config, Arc::new(DnsResolver))
    }

    /// Creates a cluster with a custom host resolver.
    pub fn with_resolver(config: ClientConfig, resolver: Arc<dyn HostResolver>) -> Self {
        let mut validator = NodeValidator::new(resolver, config.network().connection_timeout());
        if let Some(name) = config.cluster_name() {
            validator = validator.with_cluster_name(name);
        }
        Self {
            config,
            validator,
            nodes: RwLock::new(HashMap::new()),
            partitions: PartitionTable::new(),
            tend_lock: Mutex::new(()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Bootstraps every seed host and registers the nodes found.
    ///
    /// Hosts that fail to bootstrap are logged and skipped. When two hosts
    /// report the same node name, the first one is kept. Returns the number
    /// of nodes added by this call.
    ///
    /// # Errors
    ///
    /// Returns [`AerospikeError::Connection`] if no node is known afterwards.
    pub async fn seed(&self) -> Result<usize> {
        let mut added = 0;

        for host in self.config.network().hosts() {
            let node = match self.validator.bootstrap(host).await.and_then(Node::from_identity) {
                Ok(node) => node,
                Err(e) => {
                    tracing::warn!(host = %host, error = %e, "seed host failed to bootstrap");
                    continue;
                }
            };

            let mut nodes = self.nodes.write().await;
            if nodes.contains_key(node.name()) {
                tracing::debug!(host = %host, node = %node, "node already known");
                continue;
            }
            tracing::info!(host = %host, node = %node, "added node");
            nodes.insert(node.name().to_string(), Arc::new(node));
            added += 1;
        }

        if self.nodes.read().await.is_empty() {
            return Err(AerospikeError::Connection(format!(
                "no seed host could be validated: {:?}",
                self.config.network().hosts()
            )));
        }
        Ok(added)
    }

    /// Fetches the partitions `node` owns and merges them into the table.
    ///
    /// Returns the number of partitions merged.
    ///
    /// # Errors
    ///
    /// Fails with [`AerospikeError::Connection`] when the node does not
    /// answer or returns no partition value, and with a parse error when the
    /// value is malformed. The table is left unchanged on failure.
    pub async fn refresh_partitions(&self, node: &Arc<Node>) -> Result<usize> {
        let key = node.partition_info_key();
        let timeout = self.config.network().connection_timeout();

        let mut conn = Connection::connect(node.address(), timeout).await?;
        let result = conn.request_info(&[key]).await;
        conn.close().await?;

        let value = result?
            .take(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AerospikeError::Connection(format!("node {} returned no {} value", node, key))
            })?;

        let partitions = if node.supports_new_info() {
            parse_partition_bitmap(&value)?
        } else {
            parse_partitions(&value)?
        };

        let _guard = self.tend_lock.lock().await;
        self.partitions.update(&partitions, node);
        tracing::debug!(node = %node, count = partitions.len(), "merged partitions");
        Ok(partitions.len())
    }

    /// Refreshes partitions from every known node.
    ///
    /// A node that fails is logged and skipped for this cycle. Returns the
    /// number of nodes refreshed.
    pub async fn tend_once(&self) -> usize {
        let nodes = self.nodes().await;
        let mut refreshed = 0;

        for node in &nodes {
            match self.refresh_partitions(node).await {
                Ok(_) => refreshed += 1,
                Err(e) => {
                    tracing::warn!(node = %node, error = %e, "partition refresh failed");
                }
            }
        }

        refreshed
    }

    /// Returns the known nodes.
    pub async fn nodes(&self) -> Vec<Arc<Node>> {
        self.nodes.read().await.values().cloned().collect()
    }

    /// Returns the node with the given name.
    pub async fn node(&self, name: &str) -> Option<Arc<Node>> {
        self.nodes.read().await.get(name).cloned()
    }

    /// Returns the node owning a partition in the current snapshot.
    pub fn node_for(&self, namespace: &str, partition_id: usize) -> Option<Arc<Node>> {
        self.partitions.owner(namespace, partition_id)
    }

    /// Returns the node owning the partition of a key digest.
    pub fn node_for_digest(&self, namespace: &str, digest: &[u8; DIGEST_SIZE]) -> Option<Arc<Node>> {
        let partition = Partition::from_digest(namespace, digest);
        self.node_for(namespace, usize::from(partition.id))
    }

    /// Returns the current partition map snapshot.
    pub fn partition_map(&self) -> Arc<PartitionMap> {
        self.partitions.snapshot()
    }
}
