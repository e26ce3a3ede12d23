//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Instead of each physical node having a single position on the ring, each
//! node has `R` positions (virtual nodes). This provides:
//!
//! 1. **Better Load Distribution**: more positions give a smoother share of keys
//! 2. **Gradual Rebalancing**: a joining or leaving node only touches the
//!    ring arcs next to its own positions
//!
//! # Performance Characteristics
//!
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Add/remove node**: O(R log n) ring operations plus the keys that move

use crate::digest::Digest;
use crate::node::NodeServer;
use crate::partitioner::Partitioner;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A virtual node on the hash ring.
///
/// # Invariants
///
/// - Every `VirtualNode` on a ring has a unique hash
/// - Every `VirtualNode` belongs to exactly one physical node
/// - Virtual nodes order by hash only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualNode {
    /// Position on the ring, the digest of [`VirtualNode::name`].
    pub hash: Digest,

    /// The physical node that owns this virtual node.
    pub owner: NodeServer,

    /// Index of this virtual node among its owner's `R` positions.
    pub replica: usize,
}

impl VirtualNode {
    /// Create a new virtual node at an explicit position.
    #[inline]
    pub fn new(hash: Digest, owner: NodeServer, replica: usize) -> Self {
        Self {
            hash,
            owner,
            replica,
        }
    }

    /// Create a virtual node from its owner and replica index.
    ///
    /// The position is the digest of the display name `"<owner>-<replica>"`.
    /// Replica indices never contain `-`, so distinct `(owner, replica)`
    /// pairs always hash distinct inputs.
    ///
    /// # Example
    /// ```rust
    /// use corelib::{NodeServer, VirtualNode};
    /// use corelib::partitioner::Blake3Partitioner;
    ///
    /// let vnode0 = VirtualNode::from_index(&Blake3Partitioner, &NodeServer::new("node1"), 0);
    /// assert_eq!(vnode0.name(), "node1-0");
    /// ```
    pub fn from_index<P: Partitioner + ?Sized>(
        partitioner: &P,
        owner: &NodeServer,
        replica: usize,
    ) -> Self {
        let hash = partitioner.digest(&Self::display_name(owner, replica));
        Self::new(hash, owner.clone(), replica)
    }

    /// Display name, `"<owner>-<replica>"`.
    pub fn name(&self) -> String {
        Self::display_name(&self.owner, self.replica)
    }

    #[inline]
    pub fn hash(&self) -> &Digest {
        &self.hash
    }

    #[inline]
    pub fn owner(&self) -> &NodeServer {
        &self.owner
    }

    fn display_name(owner: &NodeServer, replica: usize) -> String {
        format!("{}-{}", owner.name, replica)
    }
}

impl PartialEq for VirtualNode {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for VirtualNode {}

impl PartialOrd for VirtualNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VirtualNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode({}-{}, hash={})", self.owner, self.replica, self.hash)
    }
}

/// Size report for one virtual node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualNodeStats {
    /// Display name, `"<owner>-<replica>"`.
    pub name: String,
    pub hash: Digest,
    pub key_count: usize,
}
