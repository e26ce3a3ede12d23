//! Sharded in-memory key-value stores.
//!
//! This crate provides interchangeable store strategies behind one
//! [`KeyValueStore`] contract:
//! - [`ConsistentHashStore`]: consistent hashing with virtual nodes
//! - [`RehashingStore`]: full rehash on every topology change
//!
//! plus configuration ([`StoreConfig`], [`StoreBuilder`]) and a thread-safe
//! handle ([`SharedStore`]).

pub mod config;
pub mod error;
pub mod shared;
pub mod strategy;

pub use corelib;

pub use config::{PartitionerKind, StoreBuilder, StoreConfig, StrategyKind};
pub use corelib::{NodeStats, Rebalance, VirtualNodeStats, DEFAULT_REPLICAS};
pub use error::StoreError;
pub use shared::SharedStore;
pub use strategy::{ConsistentHashStore, KeyValueStore, RehashingStore};

/// Consistent-hashing store over `nodes` with the default replica count.
pub fn consistent_hashing<I, S>(nodes: I) -> corelib::Result<ConsistentHashStore>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ConsistentHashStore::new(nodes)
}

/// Full-rehash store over `nodes`.
pub fn rehashing<I, S>(nodes: I) -> corelib::Result<RehashingStore>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RehashingStore::new(nodes)
}
