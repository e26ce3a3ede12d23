//! Store contract tests, run against every strategy.

use store::{KeyValueStore, StoreBuilder, StrategyKind, DEFAULT_REPLICAS};
use std::collections::HashMap;

fn data() -> HashMap<String, String> {
    (0..100)
        .map(|i| (format!("key{i}"), format!("value{i}")))
        .collect()
}

fn build(strategy: StrategyKind, nodes: &[&str]) -> Box<dyn KeyValueStore> {
    nodes
        .iter()
        .fold(StoreBuilder::new().with_strategy(strategy), |b, n| b.add_node(*n))
        .build()
        .unwrap()
}

fn load(store: &mut dyn KeyValueStore, data: &HashMap<String, String>) {
    for (key, value) in data {
        store.put(key, value).unwrap();
    }
}

fn snapshot(store: &dyn KeyValueStore, data: &HashMap<String, String>) -> HashMap<String, String> {
    data.keys()
        .filter_map(|key| {
            let value = store.get(key).unwrap()?;
            Some((key.clone(), value.to_string()))
        })
        .collect()
}

fn owners(store: &dyn KeyValueStore, keys: usize) -> Vec<String> {
    (0..keys)
        .map(|i| store.locate(&format!("key{i}")).unwrap().to_string())
        .collect()
}

const STRATEGIES: [StrategyKind; 2] = [StrategyKind::Consistent, StrategyKind::Rehashing];
const NODES: [&str; 4] = ["node1", "node2", "node3", "node4"];

// ============================================================================
// Contract Tests
// ============================================================================

#[test]
fn test_put_and_get_with_static_nodes() {
    let data = data();
    for strategy in STRATEGIES {
        let mut store = build(strategy, &NODES);
        load(store.as_mut(), &data);
        assert_eq!(snapshot(store.as_ref(), &data), data, "{strategy}");
    }
}

#[test]
fn test_adding_node_keeps_every_value() {
    let data = data();
    for strategy in STRATEGIES {
        let mut store = build(strategy, &NODES);
        load(store.as_mut(), &data);

        store.add_node("node5").unwrap();
        assert_eq!(snapshot(store.as_ref(), &data), data, "{strategy}");
        assert_eq!(store.node_servers().len(), 5);
    }
}

#[test]
fn test_removing_node_keeps_every_value() {
    let data = data();
    for strategy in STRATEGIES {
        let mut store = build(strategy, &NODES);
        load(store.as_mut(), &data);

        store.remove_node("node4").unwrap();
        assert_eq!(snapshot(store.as_ref(), &data), data, "{strategy}");
        assert_eq!(store.len(), 100);
    }
}

#[test]
fn test_failed_removal_changes_nothing() {
    let data = data();
    for strategy in STRATEGIES {
        let mut store = build(strategy, &NODES);
        load(store.as_mut(), &data);
        let before = store.node_servers();

        let err = store.remove_node("node9").unwrap_err();
        assert_eq!(err, corelib::Error::NodeNotFound("node9".into()));
        assert_eq!(store.node_servers(), before, "{strategy}");
    }
}

#[test]
fn test_missing_key_is_absent_not_error() {
    for strategy in STRATEGIES {
        let store = build(strategy, &NODES);
        assert_eq!(store.get("never-written"), Ok(None), "{strategy}");
    }
}

#[test]
fn test_factories_match_original_entry_points() {
    let mut consistent = store::consistent_hashing(NODES).unwrap();
    let mut rehashing = store::rehashing(NODES).unwrap();
    consistent.put("k", "v").unwrap();
    rehashing.put("k", "v").unwrap();
    assert_eq!(consistent.get("k"), rehashing.get("k"));
}

// ============================================================================
// Movement Tests
// ============================================================================

#[test]
fn test_consistent_hashing_moves_far_fewer_keys() {
    const KEYS: usize = 2_000;
    let mut moved = HashMap::new();
    for strategy in STRATEGIES {
        let mut store = build(strategy, &NODES);
        for i in 0..KEYS {
            store.put(&format!("key{i}"), "v").unwrap();
        }
        let before = owners(store.as_ref(), KEYS);
        let rebalance = store.add_node("node5").unwrap();
        let after = owners(store.as_ref(), KEYS);

        let changed = before.iter().zip(&after).filter(|(b, a)| b != a).count();
        assert_eq!(changed, rebalance.moved_keys, "{strategy}");
        moved.insert(strategy, changed);
    }

    // Ideal is 1/5 of the keys for consistent hashing and 4/5 for mod-N.
    let consistent = moved[&StrategyKind::Consistent];
    let rehashing = moved[&StrategyKind::Rehashing];
    assert!(consistent < KEYS / 3, "consistent moved {consistent}");
    assert!(rehashing > KEYS / 2, "rehashing moved {rehashing}");
}

#[test]
fn test_keys_spread_evenly_over_nodes() {
    const KEYS: usize = 10_000;
    let mut store = build(StrategyKind::Consistent, &NODES);
    for i in 0..KEYS {
        store.put(&format!("key{i}"), "v").unwrap();
    }
    let expected = KEYS / NODES.len();
    let tolerance = (expected as f64 * 3.0 / (DEFAULT_REPLICAS as f64).sqrt()) as usize;
    for node in store.node_servers() {
        assert!(
            node.key_count.abs_diff(expected) <= tolerance,
            "{} holds {}",
            node.name,
            node.key_count
        );
    }
}
