//! Partition ownership table with copy-on-write snapshots.
//!
//! A [`PartitionMap`] maps each namespace to a fixed array of
//! [`PARTITION_COUNT`] owner slots. Adding a namespace produces a new outer
//! map that shares every existing slot array; setting an owner writes the slot
//! in place. [`PartitionTable`] publishes maps through [`ArcSwap`], so readers
//! never see a namespace before its slots are filled.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};

use super::node::Node;
use super::partition::{Partition, PARTITION_COUNT};

/// Owner slots of one namespace, indexed by partition id.
pub type PartitionSlots = Arc<[ArcSwapOption<Node>]>;

fn empty_slots() -> PartitionSlots {
    (0..PARTITION_COUNT).map(|_| ArcSwapOption::empty()).collect()
}

/// Namespace to owner-slot mapping.
#[derive(Clone, Default)]
pub struct PartitionMap {
    namespaces: HashMap<String, PartitionSlots>,
}

impl PartitionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the owner slots of `namespace`.
    pub fn slots(&self, namespace: &str) -> Option<&PartitionSlots> {
        self.namespaces.get(namespace)
    }

    /// Returns the owner of a partition.
    pub fn owner(&self, namespace: &str, partition_id: usize) -> Option<Arc<Node>> {
        self.namespaces
            .get(namespace)?
            .get(partition_id)?
            .load_full()
    }

    /// Returns true if `namespace` has slots.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Returns the known namespaces.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Returns the number of namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Returns true if no namespace is known.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl fmt::Debug for PartitionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.namespaces().collect();
        names.sort_unstable();
        f.debug_struct("PartitionMap")
            .field("namespaces", &names)
            .finish()
    }
}

/// Records `node` as owner of every partition in `partitions`.
///
/// If any namespace is missing from `existing`, the outer map is cloned once
/// (slot arrays shared by reference) and fresh empty slots are added for the
/// new namespaces. Otherwise `existing` itself is returned. Slots of
/// namespaces already in `existing` are written in place; namespaces absent
/// from `partitions` are never touched.
pub fn merge(
    existing: &Arc<PartitionMap>,
    partitions: &[Partition],
    node: &Arc<Node>,
) -> Arc<PartitionMap> {
    let mut copy: Option<PartitionMap> = None;

    for partition in partitions {
        let current = copy.as_ref().unwrap_or(&**existing);
        if !current.contains_namespace(&partition.namespace) {
            copy.get_or_insert_with(|| (**existing).clone())
                .namespaces
                .insert(partition.namespace.clone(), empty_slots());
        }
    }

    let merged = match copy {
        Some(map) => Arc::new(map),
        None => Arc::clone(existing),
    };

    for partition in partitions {
        if let Some(slot) = merged
            .namespaces
            .get(&partition.namespace)
            .and_then(|slots| slots.get(usize::from(partition.id)))
        {
            slot.store(Some(Arc::clone(node)));
        }
    }

    merged
}

/// Publisher of the current [`PartitionMap`] snapshot.
///
/// Reads are lock-free. Callers serialize [`PartitionTable::update`] calls.
pub struct PartitionTable {
    current: ArcSwap<PartitionMap>,
}

impl PartitionTable {
    /// Creates a table holding an empty map.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(PartitionMap::new()),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<PartitionMap> {
        self.current.load_full()
    }

    /// Merges `partitions` owned by `node` and publishes the result.
    pub fn update(&self, partitions: &[Partition], node: &Arc<Node>) {
        let existing = self.current.load_full();
        let merged = merge(&existing, partitions, node);
        if !Arc::ptr_eq(&existing, &merged) {
            tracing::debug!(
                node = %node,
                namespaces = merged.len(),
                "publishing partition map with new namespaces"
            );
            self.current.store(merged);
        }
    }

    /// Returns the owner of a partition in the current snapshot.
    pub fn owner(&self, namespace: &str, partition_id: usize) -> Option<Arc<Node>> {
        self.current.load().owner(namespace, partition_id)
    }
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PartitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionTable")
            .field("current", &*self.current.load())
            .finish()
    }
}
