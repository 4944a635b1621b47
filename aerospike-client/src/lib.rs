//! Async cluster client core for [Aerospike](https://aerospike.com/).
//!
//! This crate discovers cluster nodes from seed hosts over the text info
//! protocol and keeps a partition ownership table that maps every
//! `(namespace, partition)` pair to the node that owns it. Values are encoded
//! with the codec from [`aerospike_core`], re-exported as [`core`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aerospike_client::{ClientConfig, Cluster, Host};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .add_host(Host::new("127.0.0.1", 3000))
//!         .build()?;
//!     let cluster = Cluster::new(config);
//!
//!     cluster.seed().await?;
//!     cluster.tend_once().await;
//!
//!     if let Some(node) = cluster.node_for("test", 42) {
//!         println!("partition test:42 is owned by {}", node);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```rust,no_run
//! use aerospike_client::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .network(|n| n
//!         .add_host("10.0.0.1:3000".parse().unwrap())
//!         .connection_timeout(Duration::from_millis(500))
//!         .tend_interval(Duration::from_secs(1)))
//!     .allow_wide_integers(true)
//!     .build()
//!     .expect("invalid config");
//! ```
//!
//! Configuration may also be loaded with `ClientConfig::from_env()`, or from
//! YAML/TOML files with the `config-file` feature.
//!
//! # Feature Flags
//!
//! | Flag | Purpose |
//! |------|---------|
//! | `config-file` | `ClientConfig::from_yaml` / `from_toml` |

#![warn(missing_docs)]

pub mod cluster;
pub mod config;
pub mod config_file;
pub mod connection;

pub use aerospike_core as core;
pub use aerospike_core::{AerospikeError, Result};
pub use cluster::{
    BuildVersion, Cluster, Node, NodeIdentity, NodeValidator, Partition, PartitionMap,
    PartitionTable, CLUSTER_NAME_KEY, DIGEST_SIZE, PARTITION_COUNT, REPLICAS_MASTER, REPLICAS_WRITE,
};
pub use config::{
    ClientConfig, ClientConfigBuilder, ConfigError, Host, NetworkConfig, NetworkConfigBuilder,
};
pub use config_file::{FileConfig, FileNetworkConfig};
pub use connection::{
    Connection, ConnectionId, DnsResolver, HostResolver, InfoCodec, InfoRequest, InfoResponse,
    StaticResolver,
};
