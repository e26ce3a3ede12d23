//! Virtual node index.
//!
//! Maps each live node to the virtual nodes it placed on the ring, so that a
//! leaving node's positions can be found without scanning the ring.

use crate::error::{Error, Result};
use crate::node::NodeServer;
use crate::vnode::VirtualNode;
use std::collections::BTreeMap;

/// Node name to virtual nodes, ordered by node name.
#[derive(Debug, Default)]
pub struct VnodeIndex {
    nodes: BTreeMap<NodeServer, Vec<VirtualNode>>,
}

impl VnodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Records `vnodes` as the positions of `owner`.
    ///
    /// # Errors
    /// [`Error::DuplicateNode`] if `owner` is already indexed.
    pub fn insert(&mut self, owner: NodeServer, vnodes: Vec<VirtualNode>) -> Result<()> {
        if self.nodes.contains_key(owner.name()) {
            return Err(Error::DuplicateNode(owner.name));
        }
        self.nodes.insert(owner, vnodes);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<VirtualNode>> {
        self.nodes.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&[VirtualNode]> {
        self.nodes.get(name).map(Vec::as_slice)
    }

    /// Iterates nodes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeServer, &[VirtualNode])> {
        self.nodes
            .iter()
            .map(|(owner, vnodes)| (owner, vnodes.as_slice()))
    }

    /// Total number of indexed virtual nodes.
    pub fn vnode_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }
}
