//! Ring topology management.
//!
//! `Topology` owns the hash ring, the virtual node index and the partitioner,
//! and is the only place that changes which virtual nodes exist. Adding a node
//! splits each new position's slice off its current successor; removing a
//! node merges each of its partitions into the next surviving position. No
//! other partition is touched, and no key is ever re-derived from the full
//! data set.

use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::index::VnodeIndex;
use crate::node::{NodeServer, NodeStats};
use crate::partitioner::{Blake3Partitioner, Partitioner};
use crate::ring::{HashRing, Partition};
use crate::vnode::{VirtualNode, VirtualNodeStats};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Default number of virtual nodes per node.
pub const DEFAULT_REPLICAS: usize = 100;

/// Outcome of a topology change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rebalance {
    /// Node that joined or left.
    pub node: String,
    /// Virtual nodes placed or removed.
    pub virtual_nodes: usize,
    /// Keys that changed owner.
    pub moved_keys: usize,
    /// Keys discarded because the last node left.
    pub dropped_keys: usize,
}

/// Consistent hash ring with virtual nodes and the data they own.
pub struct Topology {
    ring: HashRing,
    index: VnodeIndex,
    partitioner: Box<dyn Partitioner>,
    replicas: usize,
}

impl Topology {
    /// Create an empty topology using BLAKE3 digests.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] if `replicas` is zero.
    pub fn new(replicas: usize) -> Result<Self> {
        Self::with_partitioner(Blake3Partitioner, replicas)
    }

    /// Create an empty topology placing keys and virtual nodes with
    /// `partitioner`.
    pub fn with_partitioner(partitioner: impl Partitioner, replicas: usize) -> Result<Self> {
        Self::with_boxed_partitioner(Box::new(partitioner), replicas)
    }

    pub fn with_boxed_partitioner(
        partitioner: Box<dyn Partitioner>,
        replicas: usize,
    ) -> Result<Self> {
        if replicas == 0 {
            return Err(Error::InvalidConfig(
                "replicas must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            ring: HashRing::new(),
            index: VnodeIndex::new(),
            partitioner,
            replicas,
        })
    }

    /// Virtual nodes created per node.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Number of virtual nodes on the ring.
    pub fn vnode_count(&self) -> usize {
        self.ring.len()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Read access to the underlying ring.
    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Digest of `input` under this topology's partitioner.
    pub fn digest(&self, input: &str) -> Digest {
        self.partitioner.digest(input)
    }

    /// Places `replicas` virtual nodes for a new node.
    ///
    /// Each new position `h` takes from its current successor `S` exactly the
    /// keys on the arc between `h`'s predecessor and `h`; `S` keeps the keys
    /// on `(h, S]`. Every position is computed and checked before the ring is
    /// touched, so a failed call leaves the topology unchanged.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] for an empty name
    /// - [`Error::DuplicateNode`] if the name is already live
    /// - [`Error::PositionTaken`] if a placement digest is already occupied
    pub fn add_node(&mut self, name: &str) -> Result<Rebalance> {
        if name.is_empty() {
            return Err(Error::InvalidConfig("node name must not be empty".to_string()));
        }
        if self.index.contains(name) {
            return Err(Error::DuplicateNode(name.to_string()));
        }

        let owner = NodeServer::new(name);
        let vnodes: Vec<VirtualNode> = (0..self.replicas)
            .map(|replica| VirtualNode::from_index(self.partitioner.as_ref(), &owner, replica))
            .collect();

        let mut positions = BTreeSet::new();
        for vnode in &vnodes {
            if self.ring.contains(&vnode.hash) || !positions.insert(&vnode.hash) {
                return Err(Error::PositionTaken {
                    node: name.to_string(),
                    replica: vnode.replica,
                });
            }
        }

        let mut moved_keys = 0;
        for vnode in &vnodes {
            let (claimed, from_other_node) = self.split_successor(&vnode.hash, name)?;
            debug!(vnode = %vnode.name(), claimed = claimed.len(), from_other_node, "placed virtual node");
            // Keys handed over between two of the new node's own positions
            // were already counted when they first left their old node.
            if from_other_node {
                moved_keys += claimed.len();
            }
            self.ring.insert(vnode.clone(), claimed)?;
        }
        let virtual_nodes = vnodes.len();
        self.index.insert(owner, vnodes)?;

        info!(node = name, virtual_nodes, moved_keys, "node added");
        Ok(Rebalance {
            node: name.to_string(),
            virtual_nodes,
            moved_keys,
            dropped_keys: 0,
        })
    }

    /// Takes a node's virtual nodes off the ring, merging each partition into
    /// the next position owned by a different node.
    ///
    /// Removing the last node leaves an empty topology; its keys are dropped
    /// and reported in [`Rebalance::dropped_keys`].
    ///
    /// # Errors
    /// [`Error::NodeNotFound`] if `name` is not live. The topology is left
    /// unchanged.
    pub fn remove_node(&mut self, name: &str) -> Result<Rebalance> {
        let vnodes = self
            .index
            .remove(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;

        let mut moved_keys = 0;
        let mut dropped_keys = 0;
        for vnode in &vnodes {
            let (_, partition) = self.ring.remove(&vnode.hash).ok_or_else(|| {
                Error::Corrupted(format!("{} indexed but not on the ring", vnode.name()))
            })?;

            let target = self
                .ring
                .successor_where(&vnode.hash, |next| next.owner.name != name)
                .map(|next| next.hash.clone());
            match target {
                Some(target) => {
                    debug!(vnode = %vnode.name(), into = %target, moved = partition.len(), "merged virtual node");
                    moved_keys += partition.len();
                    self.ring
                        .partition_at_mut(&target)
                        .ok_or_else(|| Error::Corrupted(format!("merge target {target} vanished")))?
                        .merge(partition);
                }
                None => dropped_keys += partition.len(),
            }
        }

        if dropped_keys > 0 {
            warn!(node = name, dropped_keys, "last node removed, ring is empty");
        }
        info!(node = name, virtual_nodes = vnodes.len(), moved_keys, "node removed");
        Ok(Rebalance {
            node: name.to_string(),
            virtual_nodes: vnodes.len(),
            moved_keys,
            dropped_keys,
        })
    }

    /// Stores `value` under `key` in the owning partition, returning the
    /// replaced value.
    ///
    /// # Errors
    /// [`Error::EmptyRing`] if there is no node.
    pub fn put(&mut self, key: &str, value: &str) -> Result<Option<String>> {
        let digest = self.partitioner.digest(key);
        let (_, partition) = self.ring.lookup_mut(&digest)?;
        Ok(partition.insert(digest, key.to_string(), value.to_string()))
    }

    /// Reads `key` from its owning partition. A key that was never written is
    /// `Ok(None)`, not an error.
    ///
    /// # Errors
    /// [`Error::EmptyRing`] if there is no node.
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        let digest = self.partitioner.digest(key);
        let (_, partition) = self.ring.lookup(&digest)?;
        Ok(partition.get(&digest, key))
    }

    /// The virtual node currently owning `key`.
    pub fn owner_of(&self, key: &str) -> Result<&VirtualNode> {
        self.ring.successor(&self.partitioner.digest(key))
    }

    /// Per-node sizes, ordered by node name.
    pub fn node_stats(&self) -> Vec<NodeStats> {
        self.index
            .iter()
            .map(|(owner, vnodes)| NodeStats {
                name: owner.name.clone(),
                virtual_nodes: vnodes.len(),
                key_count: vnodes
                    .iter()
                    .filter_map(|vnode| self.ring.partition_at(&vnode.hash))
                    .map(Partition::len)
                    .sum(),
            })
            .collect()
    }

    /// Per-virtual-node sizes, in ring order.
    pub fn vnode_stats(&self) -> Vec<VirtualNodeStats> {
        self.ring
            .iter()
            .map(|(vnode, partition)| VirtualNodeStats {
                name: vnode.name(),
                hash: vnode.hash.clone(),
                key_count: partition.len(),
            })
            .collect()
    }

    /// Total number of stored keys.
    pub fn len(&self) -> usize {
        self.ring.key_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the partition and index invariants.
    ///
    /// Every stored key must sit in the partition whose arc contains its
    /// digest, and the index must list exactly the virtual nodes on the ring.
    /// Costs a digest per stored key; meant for tests and diagnostics.
    ///
    /// # Errors
    /// [`Error::Corrupted`] describing the first violation found.
    pub fn verify(&self) -> Result<()> {
        for (vnode, partition) in self.ring.iter() {
            let pred = self
                .ring
                .predecessor(&vnode.hash)
                .map(|p| p.hash.clone())
                .unwrap_or_else(|| vnode.hash.clone());

            let mut counted = 0;
            for (digest, keys) in partition.digests() {
                if !digest.in_arc(&pred, &vnode.hash) {
                    return Err(Error::Corrupted(format!(
                        "{} holds digest {digest} outside ({pred}, {}]",
                        vnode.name(),
                        vnode.hash
                    )));
                }
                counted += keys;
            }
            if counted != partition.len() {
                return Err(Error::Corrupted(format!(
                    "{} counts {} keys but holds {counted}",
                    vnode.name(),
                    partition.len()
                )));
            }
            for (digest, key, _) in partition.iter() {
                if &self.partitioner.digest(key) != digest {
                    return Err(Error::Corrupted(format!("key {key:?} filed under {digest}")));
                }
            }
        }

        if self.index.vnode_count() != self.ring.len() {
            return Err(Error::Corrupted(format!(
                "index lists {} virtual nodes, ring holds {}",
                self.index.vnode_count(),
                self.ring.len()
            )));
        }
        for (owner, vnodes) in self.index.iter() {
            if vnodes.len() != self.replicas {
                return Err(Error::Corrupted(format!(
                    "{owner} has {} virtual nodes, expected {}",
                    vnodes.len(),
                    self.replicas
                )));
            }
            for vnode in vnodes {
                match self.ring.successor(&vnode.hash) {
                    Ok(placed) if placed.hash == vnode.hash && placed.owner == *owner => {}
                    _ => {
                        return Err(Error::Corrupted(format!(
                            "{} indexed but not on the ring",
                            vnode.name()
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    /// Splits the keys a new position at `hash` claims off its successor,
    /// and reports whether that successor belongs to a node other than
    /// `joining`.
    fn split_successor(&mut self, hash: &Digest, joining: &str) -> Result<(Partition, bool)> {
        match self.ring.lookup_mut(hash) {
            Ok((successor, partition)) => {
                let from_other_node = successor.owner.name != joining;
                let successor = successor.hash.clone();
                Ok((partition.split_off_outside(hash, &successor), from_other_node))
            }
            Err(Error::EmptyRing) => Ok((Partition::new(), false)),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("partitioner", &self.partitioner.name())
            .field("replicas", &self.replicas)
            .field("nodes", &self.index.len())
            .field("vnodes", &self.ring.len())
            .finish()
    }
}
