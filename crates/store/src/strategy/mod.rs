//! Store strategy abstractions.
//!
//! A strategy decides which node owns a key and what happens to stored data
//! when nodes join or leave. Both strategies satisfy the same contract:
//!
//! - **ConsistentHashStore**: virtual nodes on a hash ring; a topology change
//!   only relocates keys next to the affected ring positions
//! - **RehashingStore**: `hash(key) mod node_count`; every topology change
//!   re-places every key

pub mod consistent;
pub mod rehashing;

pub use consistent::ConsistentHashStore;
pub use rehashing::RehashingStore;

use corelib::{NodeStats, Rebalance, Result};
use std::fmt;

/// Client and topology surface shared by every store strategy.
///
/// Mutations need `&mut self`; wrap a store in [`crate::SharedStore`] to use
/// it from several threads.
///
/// # Errors
///
/// - [`corelib::Error::EmptyRing`] for `put`/`get`/`locate` while no node exists
/// - [`corelib::Error::DuplicateNode`] for `add_node` with a live name
/// - [`corelib::Error::NodeNotFound`] for `remove_node` with an unknown name
///
/// A missing key is not an error: `get` returns `Ok(None)`.
pub trait KeyValueStore: fmt::Debug + Send + Sync + 'static {
    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<&str>>;

    /// Adds a node and relocates the keys it now owns.
    fn add_node(&mut self, name: &str) -> Result<Rebalance>;

    /// Removes a node, handing its keys to the nodes that remain.
    fn remove_node(&mut self, name: &str) -> Result<Rebalance>;

    /// One entry per live node, ordered by node name.
    fn node_servers(&self) -> Vec<NodeStats>;

    /// Name of the node that owns (or would own) `key`.
    fn locate(&self, key: &str) -> Result<&str>;

    /// Total number of stored keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the strategy name (for logging/metrics).
    fn name(&self) -> &'static str;
}
