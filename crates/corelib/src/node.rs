//! Node abstractions for the consistent hash ring.
//!
//! A `NodeServer` is a named physical shard. Its identity is its name: two
//! live nodes never share one, and nodes order lexicographically by it.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Named physical shard participating in the ring.
///
/// Keep this struct small and cheap to clone; it is copied into every one of
/// the node's virtual nodes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeServer {
    /// Unique node name.
    pub name: String,
}

impl NodeServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for NodeServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// Ordering and hashing derive from `name` alone, so lookups by `&str` agree.
impl Borrow<str> for NodeServer {
    fn borrow(&self) -> &str {
        &self.name
    }
}

/// Size report for one live node, aggregated across its virtual nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    pub name: String,
    /// Number of ring positions the node holds.
    pub virtual_nodes: usize,
    /// Number of keys currently stored on the node.
    pub key_count: usize,
}
