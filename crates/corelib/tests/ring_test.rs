//! Comprehensive tests for the hash ring topology.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, add/lookup, remove
//! 2. **Multiple nodes**: Distribution, consistency
//! 3. **Edge cases**: Wraparound, single node, re-adding a node
//! 4. **Rebalancing**: Only claimed keys move on add, only the leaving node's keys on remove

use corelib::partitioner::{Blake3Partitioner, Xxh3Partitioner};
use corelib::{Error, Topology};
use std::collections::HashMap;

fn loaded(nodes: &[&str], replicas: usize, keys: usize) -> Topology {
    let mut topology = Topology::new(replicas).unwrap();
    for node in nodes {
        topology.add_node(node).unwrap();
    }
    for i in 0..keys {
        topology.put(&format!("key{i}"), &format!("value{i}")).unwrap();
    }
    topology
}

fn owners(topology: &Topology, keys: usize) -> HashMap<String, String> {
    (0..keys)
        .map(|i| {
            let key = format!("key{i}");
            let owner = topology.owner_of(&key).unwrap().name();
            (key, owner)
        })
        .collect()
}

fn assert_round_trip(topology: &Topology, keys: usize) {
    for i in 0..keys {
        assert_eq!(
            topology.get(&format!("key{i}")).unwrap(),
            Some(format!("value{i}").as_str()),
            "key{i} lost its value"
        );
    }
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let topology = Topology::new(100).unwrap();
    assert_eq!(topology.get("key1"), Err(Error::EmptyRing));
    assert_eq!(topology.node_count(), 0);
    assert_eq!(topology.vnode_count(), 0);
    assert!(topology.is_empty());
}

#[test]
fn test_add_node_and_lookup() {
    let mut topology = Topology::new(4).unwrap();
    topology.add_node("node1").unwrap();

    assert_eq!(topology.node_count(), 1);
    assert_eq!(topology.vnode_count(), 4);

    topology.put("test-key", "v").unwrap();
    let owner = topology.owner_of("test-key").unwrap();
    assert_eq!(owner.owner().name(), "node1", "Should return the added node");
}

#[test]
fn test_remove_node() {
    let mut topology = loaded(&["node1", "node2"], 4, 50);
    assert_eq!(topology.vnode_count(), 8);

    topology.remove_node("node1").unwrap();
    assert_eq!(topology.node_count(), 1);
    assert_eq!(topology.vnode_count(), 4);
    assert_eq!(topology.owner_of("some-key").unwrap().owner().name(), "node2");
    assert_round_trip(&topology, 50);

    assert_eq!(
        topology.remove_node("node999"),
        Err(Error::NodeNotFound("node999".into()))
    );
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_consistent_lookup() {
    let topology = loaded(&["node1", "node2"], 4, 10);
    let first = topology.owner_of("consistent-key").unwrap().name();
    for _ in 0..3 {
        assert_eq!(topology.owner_of("consistent-key").unwrap().name(), first);
        assert_eq!(topology.get("key3").unwrap(), Some("value3"));
    }
}

#[test]
fn test_scenario_add_then_remove() {
    let mut topology = loaded(&["node1", "node2", "node3", "node4"], 100, 100);
    assert_round_trip(&topology, 100);

    topology.add_node("node5").unwrap();
    assert_round_trip(&topology, 100);

    topology.remove_node("node4").unwrap();
    assert_round_trip(&topology, 100);

    let before = topology.vnode_stats();
    assert_eq!(
        topology.remove_node("node9"),
        Err(Error::NodeNotFound("node9".into()))
    );
    assert_eq!(topology.vnode_stats(), before, "failed removal changed the ring");
    topology.verify().unwrap();
}

#[test]
fn test_distribution_is_balanced() {
    const KEYS: usize = 10_000;
    const REPLICAS: usize = 100;
    let topology = loaded(&["node1", "node2", "node3", "node4"], REPLICAS, KEYS);

    // A node's share varies by about 1/sqrt(R) of the mean; allow three times that.
    let expected = KEYS / 4;
    let tolerance = (expected as f64 * 3.0 / (REPLICAS as f64).sqrt()) as usize;
    for stats in topology.node_stats() {
        assert!(
            stats.key_count.abs_diff(expected) <= tolerance,
            "{} holds {} keys, expected {expected} +/- {tolerance}",
            stats.name,
            stats.key_count
        );
    }
}

// ============================================================================
// Rebalancing Tests
// ============================================================================

#[test]
fn test_add_moves_keys_only_to_new_node() {
    let mut topology = loaded(&["node1", "node2", "node3", "node4"], 100, 1_000);
    let before = owners(&topology, 1_000);

    let rebalance = topology.add_node("node5").unwrap();
    let after = owners(&topology, 1_000);

    let moved: Vec<&String> = before
        .keys()
        .filter(|key| before[*key] != after[*key])
        .collect();
    assert_eq!(moved.len(), rebalance.moved_keys);
    for key in moved {
        assert!(after[key].starts_with("node5-"), "{key} moved to {}", after[key]);
    }
}

#[test]
fn test_remove_moves_only_leaving_nodes_keys() {
    let mut topology = loaded(&["node1", "node2", "node3", "node4"], 100, 1_000);
    let before = owners(&topology, 1_000);

    topology.remove_node("node2").unwrap();
    let after = owners(&topology, 1_000);

    for (key, owner) in &before {
        if owner.starts_with("node2-") {
            assert!(!after[key].starts_with("node2-"));
        } else {
            assert_eq!(&after[key], owner, "{key} moved although its owner stayed");
        }
    }
    assert_round_trip(&topology, 1_000);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_single_node() {
    let topology = loaded(&["node1"], 4, 20);
    for key in ["key1", "key2", "key3", "very-long-key-name"] {
        assert_eq!(topology.owner_of(key).unwrap().owner().name(), "node1");
    }
    assert_round_trip(&topology, 20);
}

#[test]
fn test_add_remove_add() {
    let mut topology = Topology::new(4).unwrap();

    topology.add_node("node1").unwrap();
    topology.remove_node("node1").unwrap();
    assert_eq!(topology.node_count(), 0);
    assert_eq!(topology.put("key", "v"), Err(Error::EmptyRing));

    topology.add_node("node1").unwrap();
    assert_eq!(topology.node_count(), 1);
    assert!(topology.put("key", "v").is_ok());
}

#[test]
fn test_duplicate_add_is_rejected() {
    let mut topology = Topology::new(4).unwrap();
    topology.add_node("node1").unwrap();

    assert_eq!(
        topology.add_node("node1"),
        Err(Error::DuplicateNode("node1".into()))
    );
    assert_eq!(topology.vnode_count(), 4);
    assert_eq!(topology.node_count(), 1);
}

#[test]
fn test_prefix_names_do_not_collide() {
    // "node1" with replica 10 and "node11" with replica 0 get separate positions.
    let mut topology = Topology::new(20).unwrap();
    topology.add_node("node1").unwrap();
    topology.add_node("node11").unwrap();
    assert_eq!(topology.vnode_count(), 40);
    topology.verify().unwrap();
}

#[test]
fn test_remove_then_readd_restores_positions() {
    let mut topology = loaded(&["node1", "node2", "node3"], 16, 300);
    let before = owners(&topology, 300);

    topology.remove_node("node2").unwrap();
    topology.add_node("node2").unwrap();

    assert_eq!(owners(&topology, 300), before);
    assert_round_trip(&topology, 300);
    topology.verify().unwrap();
}

// ============================================================================
// Utility Tests
// ============================================================================

#[test]
fn test_partitioner_name() {
    assert_eq!(
        Topology::with_partitioner(Blake3Partitioner, 1).unwrap().partitioner_name(),
        "Blake3Partitioner"
    );
    assert_eq!(
        Topology::with_partitioner(Xxh3Partitioner, 1).unwrap().partitioner_name(),
        "Xxh3Partitioner"
    );
}
