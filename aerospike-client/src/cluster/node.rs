//! Validated server nodes.

use std::fmt;
use std::net::SocketAddr;

use aerospike_core::{AerospikeError, Result};

use super::partition::{REPLICAS_MASTER, REPLICAS_WRITE};
use super::version::BuildVersion;

/// What bootstrap learned about a seed host.
///
/// `name` is `None` when no alias answered with a node name; callers treat
/// that as a failed bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeIdentity {
    /// Node name reported by the server.
    pub name: Option<String>,
    /// Build version reported alongside the name.
    pub build: Option<BuildVersion>,
    /// Whether the node answers the newer info protocol variant.
    pub supports_new_info: bool,
    /// Every address the seed host resolved to, in resolution order.
    pub aliases: Vec<SocketAddr>,
    /// The alias whose answer produced `name`.
    pub address: Option<SocketAddr>,
}

/// A validated node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    address: SocketAddr,
    aliases: Vec<SocketAddr>,
    build: Option<BuildVersion>,
    supports_new_info: bool,
}

impl Node {
    /// Creates a node reachable at `address`.
    pub fn new(name: impl Into<String>, address: SocketAddr, supports_new_info: bool) -> Self {
        Self {
            name: name.into(),
            address,
            aliases: vec![address],
            build: None,
            supports_new_info,
        }
    }

    /// Builds a node from a bootstrap result.
    ///
    /// Fails with [`AerospikeError::Connection`] when the identity has no name.
    pub fn from_identity(identity: NodeIdentity) -> Result<Self> {
        let (Some(name), Some(address)) = (identity.name, identity.address) else {
            return Err(AerospikeError::Connection(format!(
                "no alias of {:?} reported a node name",
                identity.aliases
            )));
        };

        Ok(Self {
            name,
            address,
            aliases: identity.aliases,
            build: identity.build,
            supports_new_info: identity.supports_new_info,
        })
    }

    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the address used for info requests.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Returns every known address of the node.
    pub fn aliases(&self) -> &[SocketAddr] {
        &self.aliases
    }

    /// Returns the reported build version.
    pub fn build(&self) -> Option<BuildVersion> {
        self.build
    }

    /// Returns whether the node answers the newer info protocol variant.
    pub fn supports_new_info(&self) -> bool {
        self.supports_new_info
    }

    /// Returns the info key that lists the partitions this node owns.
    pub fn partition_info_key(&self) -> &'static str {
        if self.supports_new_info {
            REPLICAS_MASTER
        } else {
            REPLICAS_WRITE
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_identity() {
        let identity = NodeIdentity {
            name: Some("BB9".to_string()),
            build: Some(BuildVersion::new(5, 1, 0)),
            supports_new_info: true,
            aliases: vec![addr("10.0.0.1:3000"), addr("10.0.0.2:3000")],
            address: Some(addr("10.0.0.2:3000")),
        };
        let node = Node::from_identity(identity).unwrap();
        assert_eq!(node.name(), "BB9");
        assert_eq!(node.address(), addr("10.0.0.2:3000"));
        assert_eq!(node.aliases().len(), 2);
        assert_eq!(node.build(), Some(BuildVersion::new(5, 1, 0)));
        assert_eq!(node.partition_info_key(), "replicas-master");
        assert_eq!(node.to_string(), "BB9 10.0.0.2:3000");
    }

    #[test]
    fn test_unnamed_identity_fails() {
        let identity = NodeIdentity {
            aliases: vec![addr("10.0.0.1:3000")],
            ..Default::default()
        };
        assert!(matches!(
            Node::from_identity(identity),
            Err(AerospikeError::Connection(_))
        ));
    }

    #[test]
    fn test_old_node_uses_decimal_key() {
        let node = Node::new("A", addr("127.0.0.1:3000"), false);
        assert_eq!(node.partition_info_key(), "replicas-write");
    }
}
