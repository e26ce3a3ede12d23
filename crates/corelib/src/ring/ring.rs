//! Hash ring data structure.
//!
//! Holds `BTreeMap<Digest, Slot>`: each virtual node's position maps to the
//! virtual node itself and the partition it owns. A key is owned by the
//! first virtual node at or after its digest, wrapping past the largest
//! position back to the smallest.

use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::ring::partition::Partition;
use crate::vnode::VirtualNode;
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Debug)]
struct Slot {
    vnode: VirtualNode,
    partition: Partition,
}

/// Ordered map of virtual node positions to their partitions.
///
/// The ring only does local structural operations; it never re-derives
/// ownership for keys it was not asked about.
#[derive(Debug, Default)]
pub struct HashRing {
    slots: BTreeMap<Digest, Slot>,
}

impl HashRing {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, hash: &Digest) -> bool {
        self.slots.contains_key(hash)
    }

    /// Returns the virtual node with the smallest hash `>= digest`, wrapping
    /// to the smallest hash overall.
    ///
    /// # Errors
    /// [`Error::EmptyRing`] if there are no virtual nodes.
    pub fn successor(&self, digest: &Digest) -> Result<&VirtualNode> {
        self.lookup(digest).map(|(vnode, _)| vnode)
    }

    /// Like [`HashRing::successor`] but also returns the owned partition.
    pub fn lookup(&self, digest: &Digest) -> Result<(&VirtualNode, &Partition)> {
        self.slots
            .range(digest..)
            .next()
            .or_else(|| self.slots.iter().next())
            .map(|(_, slot)| (&slot.vnode, &slot.partition))
            .ok_or(Error::EmptyRing)
    }

    /// Mutable access to the partition owning `digest`.
    pub fn lookup_mut(&mut self, digest: &Digest) -> Result<(&VirtualNode, &mut Partition)> {
        let wraps = self.slots.range(digest..).next().is_none();
        let slot = if wraps {
            self.slots.iter_mut().next()
        } else {
            self.slots.range_mut(digest..).next()
        };
        slot.map(|(_, slot)| (&slot.vnode, &mut slot.partition))
            .ok_or(Error::EmptyRing)
    }

    /// Returns the virtual node strictly before `hash` in ring order,
    /// wrapping to the largest position. A lone virtual node is its own
    /// predecessor.
    pub fn predecessor(&self, hash: &Digest) -> Option<&VirtualNode> {
        self.slots
            .range(..hash)
            .next_back()
            .or_else(|| self.slots.iter().next_back())
            .map(|(_, slot)| &slot.vnode)
    }

    /// Walks clockwise from `hash` (exclusive), wrapping once, and returns
    /// the first virtual node accepted by `accept`.
    pub fn successor_where<F>(&self, hash: &Digest, mut accept: F) -> Option<&VirtualNode>
    where
        F: FnMut(&VirtualNode) -> bool,
    {
        self.slots
            .range((Bound::Excluded(hash), Bound::Unbounded))
            .chain(self.slots.range(..=hash))
            .map(|(_, slot)| &slot.vnode)
            .find(|vnode| accept(vnode))
    }

    /// Places `vnode` on the ring owning `partition`.
    ///
    /// # Errors
    /// [`Error::PositionTaken`] if another virtual node holds the position.
    pub fn insert(&mut self, vnode: VirtualNode, partition: Partition) -> Result<()> {
        if self.slots.contains_key(&vnode.hash) {
            return Err(Error::PositionTaken {
                node: vnode.owner.name,
                replica: vnode.replica,
            });
        }
        self.slots
            .insert(vnode.hash.clone(), Slot { vnode, partition });
        Ok(())
    }

    /// Takes the virtual node at `hash` off the ring along with its partition.
    pub fn remove(&mut self, hash: &Digest) -> Option<(VirtualNode, Partition)> {
        self.slots
            .remove(hash)
            .map(|slot| (slot.vnode, slot.partition))
    }

    pub fn partition_at(&self, hash: &Digest) -> Option<&Partition> {
        self.slots.get(hash).map(|slot| &slot.partition)
    }

    pub fn partition_at_mut(&mut self, hash: &Digest) -> Option<&mut Partition> {
        self.slots.get_mut(hash).map(|slot| &mut slot.partition)
    }

    /// Iterates virtual nodes and their partitions in ring order.
    pub fn iter(&self) -> impl Iterator<Item = (&VirtualNode, &Partition)> {
        self.slots.values().map(|slot| (&slot.vnode, &slot.partition))
    }

    /// Total number of keys across all partitions.
    pub fn key_count(&self) -> usize {
        self.slots.values().map(|slot| slot.partition.len()).sum()
    }
}
