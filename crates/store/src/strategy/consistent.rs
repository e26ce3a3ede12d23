//! Consistent-hashing store.
//!
//! Each node is represented by `R` virtual nodes on a hash ring, and each
//! virtual node owns the keys on the arc ending at its position.
//!
//! # Algorithm
//!
//! 1. `put`/`get` hash the key and find the first virtual node at or after
//!    the digest, wrapping around the ring
//! 2. `add_node` places `R` positions; each takes its slice of keys from the
//!    virtual node that owned that slice before
//! 3. `remove_node` merges each of the node's partitions into the next
//!    virtual node owned by someone else
//!
//! # Performance
//!
//! - **put/get**: O(log v) where v = virtual nodes on the ring
//! - **add/remove node**: O(R log v) plus the keys that actually move, never
//!   proportional to the total key count

use crate::strategy::KeyValueStore;
use corelib::{NodeStats, Rebalance, Result, Topology, VirtualNodeStats, DEFAULT_REPLICAS};
use metrics::{counter, gauge};

const STRATEGY: &str = "consistent";

/// Key-value store placing keys with consistent hashing and virtual nodes.
///
/// # Example
///
/// ```rust
/// use store::{ConsistentHashStore, KeyValueStore};
///
/// let mut store = ConsistentHashStore::new(["node1", "node2"]).unwrap();
/// store.put("my-key", "my-value").unwrap();
/// store.add_node("node3").unwrap();
/// assert_eq!(store.get("my-key").unwrap(), Some("my-value"));
/// ```
#[derive(Debug)]
pub struct ConsistentHashStore {
    topology: Topology,
}

impl ConsistentHashStore {
    /// Create a store with [`DEFAULT_REPLICAS`] virtual nodes per node.
    ///
    /// An empty `nodes` list gives an empty store that rejects lookups until
    /// a node is added.
    pub fn new<I, S>(nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_replicas(DEFAULT_REPLICAS, nodes)
    }

    /// Create a store with `replicas` virtual nodes per node.
    pub fn with_replicas<I, S>(replicas: usize, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_topology(Topology::new(replicas)?, nodes)
    }

    /// Wrap an existing topology and add `nodes` to it in order.
    pub fn with_topology<I, S>(topology: Topology, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self { topology };
        for node in nodes {
            store.topology.add_node(node.as_ref())?;
        }
        gauge!("kvring_nodes", "strategy" => STRATEGY).set(store.topology.node_count() as f64);
        Ok(store)
    }

    /// The underlying ring topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Per-virtual-node sizes in ring order.
    pub fn virtual_nodes(&self) -> Vec<VirtualNodeStats> {
        self.topology.vnode_stats()
    }

    fn record(&self, op: &'static str, rebalance: &Rebalance) {
        counter!("kvring_keys_relocated_total", "op" => op, "strategy" => STRATEGY)
            .increment(rebalance.moved_keys as u64);
        gauge!("kvring_nodes", "strategy" => STRATEGY).set(self.topology.node_count() as f64);
    }
}

impl KeyValueStore for ConsistentHashStore {
    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        counter!("kvring_puts_total", "strategy" => STRATEGY).increment(1);
        self.topology.put(key, value).map(|_| ())
    }

    fn get(&self, key: &str) -> Result<Option<&str>> {
        counter!("kvring_gets_total", "strategy" => STRATEGY).increment(1);
        self.topology.get(key)
    }

    fn add_node(&mut self, name: &str) -> Result<Rebalance> {
        let rebalance = self.topology.add_node(name)?;
        self.record("add_node", &rebalance);
        Ok(rebalance)
    }

    fn remove_node(&mut self, name: &str) -> Result<Rebalance> {
        let rebalance = self.topology.remove_node(name)?;
        self.record("remove_node", &rebalance);
        Ok(rebalance)
    }

    fn node_servers(&self) -> Vec<NodeStats> {
        self.topology.node_stats()
    }

    fn locate(&self, key: &str) -> Result<&str> {
        self.topology.owner_of(key).map(|vnode| vnode.owner().name())
    }

    fn len(&self) -> usize {
        self.topology.len()
    }

    fn name(&self) -> &'static str {
        "ConsistentHashStore"
    }
}
