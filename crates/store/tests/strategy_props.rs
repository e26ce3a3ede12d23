//! Both strategies honour the same contract for any operation sequence.

use proptest::prelude::*;
use std::collections::HashMap;
use store::{KeyValueStore, StoreBuilder, StrategyKind};

const NODES: [&str; 4] = ["n1", "n2", "n3", "n4"];

#[derive(Clone, Debug)]
enum Op {
    Put(u8, u8),
    Get(u8),
    Add(usize),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<u8>(), any::<u8>()).prop_map(|(k, v)| Op::Put(k, v)),
        2 => any::<u8>().prop_map(Op::Get),
        1 => (0..NODES.len()).prop_map(Op::Add),
        1 => (0..NODES.len()).prop_map(Op::Remove),
    ]
}

fn store(strategy: StrategyKind) -> Box<dyn KeyValueStore> {
    StoreBuilder::new()
        .with_strategy(strategy)
        .with_replicas(6)
        .add_node("n1")
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn strategies_agree_on_every_result(ops in prop::collection::vec(op(), 1..100)) {
        let mut consistent = store(StrategyKind::Consistent);
        let mut rehashing = store(StrategyKind::Rehashing);
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    let (key, value) = (format!("key{k}"), format!("value{v}"));
                    let a = consistent.put(&key, &value);
                    let b = rehashing.put(&key, &value);
                    prop_assert_eq!(&a, &b);
                    if a.is_ok() {
                        model.insert(key, value);
                    }
                }
                Op::Get(k) => {
                    let key = format!("key{k}");
                    let a = consistent.get(&key);
                    prop_assert_eq!(&a, &rehashing.get(&key));
                    if let Ok(found) = a {
                        prop_assert_eq!(found, model.get(&key).map(String::as_str));
                    }
                }
                Op::Add(n) => {
                    let a = consistent.add_node(NODES[n]).map(|r| r.node);
                    let b = rehashing.add_node(NODES[n]).map(|r| r.node);
                    prop_assert_eq!(a, b);
                }
                Op::Remove(n) => {
                    let a = consistent.remove_node(NODES[n]).map(|r| r.dropped_keys);
                    let b = rehashing.remove_node(NODES[n]).map(|r| r.dropped_keys);
                    prop_assert_eq!(&a, &b);
                    if consistent.node_servers().is_empty() {
                        model.clear();
                    }
                }
            }
            prop_assert_eq!(consistent.len(), model.len());
            prop_assert_eq!(rehashing.len(), model.len());
        }
    }
}
