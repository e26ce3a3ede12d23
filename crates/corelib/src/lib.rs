//! Core library for the consistent-hashing key-value store.
//!
//! This crate provides the fundamental abstractions for consistent hashing:
//! - Digests and partitioners (the hash function adapter)
//! - Node and virtual node identities
//! - The hash ring and the partitions its virtual nodes own
//! - The virtual node index
//! - Topology management: adding and removing nodes with local rebalancing

pub mod digest;
pub mod error;
pub mod index;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod topology;
pub mod vnode;

pub use digest::Digest;
pub use error::{Error, Result};
pub use index::VnodeIndex;
pub use node::{NodeServer, NodeStats};
pub use partitioner::Partitioner;
pub use ring::{HashRing, Partition, Ring};
pub use topology::{Rebalance, Topology, DEFAULT_REPLICAS};
pub use vnode::{VirtualNode, VirtualNodeStats};
