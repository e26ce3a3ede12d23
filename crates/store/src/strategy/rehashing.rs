//! Full-rehash store.
//!
//! Places a key on node `siphash13(key) mod node_count`. Because the modulus
//! changes with the node count, every topology change re-places every stored
//! key. This is the baseline the consistent-hashing store is measured
//! against.
//!
//! # Performance
//!
//! - **put/get**: O(1)
//! - **add/remove node**: O(k) where k = total stored keys

use crate::strategy::KeyValueStore;
use corelib::{Error, NodeServer, NodeStats, Rebalance, Result};
use metrics::{counter, gauge};
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::Hasher;
use tracing::{info, warn};

const STRATEGY: &str = "rehashing";

#[derive(Debug)]
struct Shard {
    server: NodeServer,
    data: HashMap<String, String>,
}

/// Key-value store placing keys with `hash(key) mod node_count`.
#[derive(Debug, Default)]
pub struct RehashingStore {
    /// Nodes in the order they joined; a key's slot indexes this list.
    shards: Vec<Shard>,
}

impl RehashingStore {
    /// Create a store with `nodes` in order.
    ///
    /// # Errors
    /// [`Error::DuplicateNode`] if a name repeats.
    pub fn new<I, S>(nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::default();
        for node in nodes {
            store.add_node(node.as_ref())?;
        }
        Ok(store)
    }

    fn slot(&self, key: &str) -> Result<usize> {
        if self.shards.is_empty() {
            return Err(Error::EmptyRing);
        }
        let mut hasher = SipHasher13::new();
        hasher.write(key.as_bytes());
        Ok((hasher.finish() % self.shards.len() as u64) as usize)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.shards.iter().position(|shard| shard.server.name == name)
    }

    /// Empties every shard, returning `(previous owner, key, value)`.
    fn drain(&mut self) -> Vec<(String, String, String)> {
        self.shards
            .iter_mut()
            .flat_map(|shard| {
                let owner = shard.server.name.clone();
                shard
                    .data
                    .drain()
                    .map(move |(key, value)| (owner.clone(), key, value))
            })
            .collect()
    }

    /// Re-places every entry, returning how many landed on a different node.
    fn redistribute(&mut self, entries: Vec<(String, String, String)>) -> Result<usize> {
        let mut moved = 0;
        for (owner, key, value) in entries {
            let slot = self.slot(&key)?;
            let shard = &mut self.shards[slot];
            if shard.server.name != owner {
                moved += 1;
            }
            shard.data.insert(key, value);
        }
        Ok(moved)
    }

    fn record(&self, op: &'static str, rebalance: &Rebalance) {
        counter!("kvring_keys_relocated_total", "op" => op, "strategy" => STRATEGY)
            .increment(rebalance.moved_keys as u64);
        gauge!("kvring_nodes", "strategy" => STRATEGY).set(self.shards.len() as f64);
    }
}

impl KeyValueStore for RehashingStore {
    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        counter!("kvring_puts_total", "strategy" => STRATEGY).increment(1);
        let slot = self.slot(key)?;
        self.shards[slot]
            .data
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<&str>> {
        counter!("kvring_gets_total", "strategy" => STRATEGY).increment(1);
        let slot = self.slot(key)?;
        Ok(self.shards[slot].data.get(key).map(String::as_str))
    }

    fn add_node(&mut self, name: &str) -> Result<Rebalance> {
        if name.is_empty() {
            return Err(Error::InvalidConfig("node name must not be empty".to_string()));
        }
        if self.position(name).is_some() {
            return Err(Error::DuplicateNode(name.to_string()));
        }

        let entries = self.drain();
        self.shards.push(Shard {
            server: NodeServer::new(name),
            data: HashMap::new(),
        });
        let moved_keys = self.redistribute(entries)?;

        info!(node = name, moved_keys, "node added, all keys rehashed");
        let rebalance = Rebalance {
            node: name.to_string(),
            virtual_nodes: 1,
            moved_keys,
            dropped_keys: 0,
        };
        self.record("add_node", &rebalance);
        Ok(rebalance)
    }

    fn remove_node(&mut self, name: &str) -> Result<Rebalance> {
        let position = self
            .position(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;

        let entries = self.drain();
        self.shards.remove(position);
        let (moved_keys, dropped_keys) = if self.shards.is_empty() {
            warn!(node = name, dropped_keys = entries.len(), "last node removed, store is empty");
            (0, entries.len())
        } else {
            (self.redistribute(entries)?, 0)
        };

        info!(node = name, moved_keys, "node removed, all keys rehashed");
        let rebalance = Rebalance {
            node: name.to_string(),
            virtual_nodes: 1,
            moved_keys,
            dropped_keys,
        };
        self.record("remove_node", &rebalance);
        Ok(rebalance)
    }

    fn node_servers(&self) -> Vec<NodeStats> {
        let mut stats: Vec<NodeStats> = self
            .shards
            .iter()
            .map(|shard| NodeStats {
                name: shard.server.name.clone(),
                virtual_nodes: 1,
                key_count: shard.data.len(),
            })
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    fn locate(&self, key: &str) -> Result<&str> {
        let slot = self.slot(key)?;
        Ok(self.shards[slot].server.name())
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.data.len()).sum()
    }

    fn name(&self) -> &'static str {
        "RehashingStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(nodes: &[&str], keys: usize) -> RehashingStore {
        let mut store = RehashingStore::new(nodes).unwrap();
        for i in 0..keys {
            store.put(&format!("key{i}"), &format!("value{i}")).unwrap();
        }
        store
    }

    #[test]
    fn test_round_trip_across_topology_changes() {
        let mut store = loaded(&["node1", "node2", "node3", "node4"], 100);

        store.add_node("node5").unwrap();
        store.remove_node("node4").unwrap();

        for i in 0..100 {
            assert_eq!(
                store.get(&format!("key{i}")).unwrap(),
                Some(format!("value{i}").as_str())
            );
        }
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_errors_match_the_store_contract() {
        let mut store = RehashingStore::new(["a"]).unwrap();
        assert_eq!(store.add_node("a"), Err(Error::DuplicateNode("a".into())));
        assert_eq!(store.remove_node("b"), Err(Error::NodeNotFound("b".into())));

        store.put("k", "v").unwrap();
        let rebalance = store.remove_node("a").unwrap();
        assert_eq!(rebalance.dropped_keys, 1);
        assert_eq!(store.get("k"), Err(Error::EmptyRing));
    }

    #[test]
    fn test_node_servers_sorted_by_name() {
        let store = loaded(&["zeta", "alpha", "mu"], 30);
        let names: Vec<String> = store.node_servers().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["alpha", "mu", "zeta"]);
    }
}
