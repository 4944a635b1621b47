//! Node bootstrap, partition parsing and the partition routing table.

mod bootstrap;
mod cluster_service;
mod node;
mod partition;
mod partition_map;
mod version;

pub use bootstrap::{NodeValidator, BUILD_KEY, CLUSTER_NAME_KEY, NODE_KEY};
pub use cluster_service::Cluster;
pub use node::{Node, NodeIdentity};
pub use partition::{
    parse_partition_bitmap, parse_partitions, Partition, DIGEST_SIZE, MAX_NAMESPACE_LEN,
    PARTITION_COUNT, REPLICAS_MASTER, REPLICAS_WRITE,
};
pub use partition_map::{merge, PartitionMap, PartitionSlots, PartitionTable};
pub use version::{BuildVersion, NEW_INFO_VERSION};
