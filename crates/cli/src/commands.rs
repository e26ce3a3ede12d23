//! CLI commands.
//!
//! Every command builds a fresh store from the resolved [`StoreConfig`],
//! loads `key0..key{N-1}` with values `value0..value{N-1}` and then inspects
//! or changes the topology.

use anyhow::{ensure, Result};
use clap::Subcommand;
use serde::Serialize;
use std::fmt;
use store::{KeyValueStore, Rebalance, StoreConfig, StrategyKind};
use tracing::info;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load keys and show how they spread over the nodes.
    Distribution {
        /// Number of keys to load.
        #[arg(short, long, default_value_t = 1000)]
        keys: usize,
    },

    /// Load keys, add a node and report the keys that moved.
    AddNode {
        /// Name of the node to add.
        name: String,
        #[arg(short, long, default_value_t = 1000)]
        keys: usize,
    },

    /// Load keys, remove a node and report the keys that moved.
    RemoveNode {
        /// Name of the node to remove.
        name: String,
        #[arg(short, long, default_value_t = 1000)]
        keys: usize,
    },

    /// Add the same node under both strategies and compare key movement.
    Compare {
        /// Name of the node to add.
        #[arg(long)]
        add: String,
        #[arg(short, long, default_value_t = 1000)]
        keys: usize,
    },
}

/// Load of one node relative to the mean.
#[derive(Debug, Clone, Serialize)]
pub struct NodeLoad {
    pub name: String,
    pub virtual_nodes: usize,
    pub key_count: usize,
    /// Percentage above (positive) or below the mean.
    pub deviation_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub strategy: StrategyKind,
    pub keys: usize,
    pub nodes: Vec<NodeLoad>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebalanceReport {
    pub strategy: StrategyKind,
    pub keys: usize,
    pub rebalance: Rebalance,
    /// Loaded keys whose owning node changed.
    pub changed_owner: usize,
    pub after: DistributionReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Movement {
    pub strategy: StrategyKind,
    pub moved_keys: usize,
    pub moved_fraction: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareReport {
    pub node: String,
    pub keys: usize,
    pub results: Vec<Movement>,
}

/// Output of a command, printable as text or JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum CommandResult {
    Distribution(DistributionReport),
    Rebalance(RebalanceReport),
    Compare(CompareReport),
}

impl Command {
    pub fn execute(&self, config: &StoreConfig) -> Result<CommandResult> {
        match self {
            Command::Distribution { keys } => {
                let store = loaded(config, *keys)?;
                Ok(CommandResult::Distribution(distribution(
                    config.strategy,
                    store.as_ref(),
                    *keys,
                )))
            }
            Command::AddNode { name, keys } => {
                let report = rebalance(config, *keys, |store| store.add_node(name))?;
                Ok(CommandResult::Rebalance(report))
            }
            Command::RemoveNode { name, keys } => {
                let report = rebalance(config, *keys, |store| store.remove_node(name))?;
                Ok(CommandResult::Rebalance(report))
            }
            Command::Compare { add, keys } => {
                let mut results = Vec::new();
                for strategy in [StrategyKind::Consistent, StrategyKind::Rehashing] {
                    let config = StoreConfig {
                        strategy,
                        ..config.clone()
                    };
                    let report = rebalance(&config, *keys, |store| store.add_node(add))?;
                    results.push(Movement {
                        strategy,
                        moved_keys: report.changed_owner,
                        moved_fraction: fraction(report.changed_owner, *keys),
                    });
                }
                Ok(CommandResult::Compare(CompareReport {
                    node: add.clone(),
                    keys: *keys,
                    results,
                }))
            }
        }
    }
}

fn key(i: usize) -> String {
    format!("key{i}")
}

fn value(i: usize) -> String {
    format!("value{i}")
}

fn loaded(config: &StoreConfig, keys: usize) -> Result<Box<dyn KeyValueStore>> {
    let mut store = config.build()?;
    for i in 0..keys {
        store.put(&key(i), &value(i))?;
    }
    info!(strategy = %config.strategy, keys, "store loaded");
    Ok(store)
}

fn owners(store: &dyn KeyValueStore, keys: usize) -> Result<Vec<String>> {
    (0..keys)
        .map(|i| -> Result<String> { Ok(store.locate(&key(i))?.to_string()) })
        .collect()
}

fn rebalance<F>(config: &StoreConfig, keys: usize, change: F) -> Result<RebalanceReport>
where
    F: FnOnce(&mut dyn KeyValueStore) -> store::corelib::Result<Rebalance>,
{
    let mut store = loaded(config, keys)?;
    let before = owners(store.as_ref(), keys)?;

    let rebalance = change(store.as_mut())?;

    let mut changed_owner = 0;
    let mut lost = 0;
    if !store.node_servers().is_empty() {
        let after = owners(store.as_ref(), keys)?;
        changed_owner = before.iter().zip(&after).filter(|(b, a)| b != a).count();
        for i in 0..keys {
            if store.get(&key(i))? != Some(value(i).as_str()) {
                lost += 1;
            }
        }
    }
    ensure!(lost == 0, "{lost} keys lost their value after rebalancing");

    Ok(RebalanceReport {
        strategy: config.strategy,
        keys,
        rebalance,
        changed_owner,
        after: distribution(config.strategy, store.as_ref(), keys),
    })
}

fn distribution(
    strategy: StrategyKind,
    store: &dyn KeyValueStore,
    keys: usize,
) -> DistributionReport {
    let stats = store.node_servers();
    let mean = store.len() as f64 / stats.len().max(1) as f64;
    let nodes = stats
        .into_iter()
        .map(|node| NodeLoad {
            deviation_pct: if mean > 0.0 {
                (node.key_count as f64 - mean) / mean * 100.0
            } else {
                0.0
            },
            name: node.name,
            virtual_nodes: node.virtual_nodes,
            key_count: node.key_count,
        })
        .collect();
    DistributionReport {
        strategy,
        keys,
        nodes,
    }
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

impl fmt::Display for DistributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} keys over {} nodes ({})",
            self.keys,
            self.nodes.len(),
            self.strategy
        )?;
        for node in &self.nodes {
            writeln!(
                f,
                "  {:<16} {:>8} keys  {:>4} vnodes  {:+7.2}%",
                node.name, node.key_count, node.virtual_nodes, node.deviation_pct
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Distribution(report) => write!(f, "{report}"),
            CommandResult::Rebalance(report) => {
                let r = &report.rebalance;
                writeln!(
                    f,
                    "{}: {} ({} vnodes), {} of {} keys changed node ({:.2}%), {} dropped",
                    report.strategy,
                    r.node,
                    r.virtual_nodes,
                    report.changed_owner,
                    report.keys,
                    fraction(report.changed_owner, report.keys) * 100.0,
                    r.dropped_keys
                )?;
                write!(f, "{}", report.after)
            }
            CommandResult::Compare(report) => {
                writeln!(f, "adding {} with {} keys loaded", report.node, report.keys)?;
                for movement in &report.results {
                    writeln!(
                        f,
                        "  {:<12} {:>8} keys moved ({:.2}%)",
                        movement.strategy.to_string(),
                        movement.moved_keys,
                        movement.moved_fraction * 100.0
                    )?;
                }
                Ok(())
            }
        }
    }
}
