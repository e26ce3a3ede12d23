//! Store configuration.
//!
//! A `StoreConfig` selects the strategy and its parameters and can be loaded
//! from a JSON file:
//!
//! ```json
//! { "strategy": "consistent", "replicas": 100, "partitioner": "blake3",
//!   "nodes": ["node1", "node2"] }
//! ```
//!
//! Every field is optional. `replicas` and `partitioner` only affect the
//! consistent strategy.

use crate::error::{Result, StoreError};
use crate::shared::SharedStore;
use crate::strategy::{ConsistentHashStore, KeyValueStore, RehashingStore};
use corelib::partitioner::{Blake3Partitioner, Partitioner, Xxh3Partitioner};
use corelib::{Error, Topology, DEFAULT_REPLICAS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Which store strategy to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Consistent hashing with virtual nodes.
    #[default]
    Consistent,
    /// `hash(key) mod node_count`, rehashing everything on change.
    Rehashing,
}

/// Which digest function places keys and virtual nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Blake3,
    Xxh3,
}

impl PartitionerKind {
    pub fn build(self) -> Box<dyn Partitioner> {
        match self {
            PartitionerKind::Blake3 => Box::new(Blake3Partitioner),
            PartitionerKind::Xxh3 => Box::new(Xxh3Partitioner),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "consistent" => Ok(StrategyKind::Consistent),
            "rehashing" => Ok(StrategyKind::Rehashing),
            _ => Err(StoreError::UnknownVariant {
                kind: "strategy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Consistent => f.write_str("consistent"),
            StrategyKind::Rehashing => f.write_str("rehashing"),
        }
    }
}

impl FromStr for PartitionerKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(PartitionerKind::Blake3),
            "xxh3" => Ok(PartitionerKind::Xxh3),
            _ => Err(StoreError::UnknownVariant {
                kind: "partitioner",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionerKind::Blake3 => f.write_str("blake3"),
            PartitionerKind::Xxh3 => f.write_str("xxh3"),
        }
    }
}

/// Parameters for building a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub strategy: StrategyKind,
    /// Virtual nodes per node.
    pub replicas: usize,
    pub partitioner: PartitionerKind,
    /// Initial nodes, added in order.
    pub nodes: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            replicas: DEFAULT_REPLICAS,
            partitioner: PartitionerKind::default(),
            nodes: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded store config");
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build the configured store, adding the initial nodes in order.
    pub fn build(&self) -> Result<Box<dyn KeyValueStore>> {
        if self.replicas == 0 {
            return Err(Error::InvalidConfig("replicas must be at least 1".to_string()).into());
        }
        let store: Box<dyn KeyValueStore> = match self.strategy {
            StrategyKind::Consistent => {
                let topology =
                    Topology::with_boxed_partitioner(self.partitioner.build(), self.replicas)?;
                Box::new(ConsistentHashStore::with_topology(topology, &self.nodes)?)
            }
            StrategyKind::Rehashing => Box::new(RehashingStore::new(&self.nodes)?),
        };
        Ok(store)
    }

    pub fn build_shared(&self) -> Result<SharedStore> {
        Ok(SharedStore::from_boxed(self.build()?))
    }
}

/// Fluent construction of a store.
///
/// # Example
///
/// ```rust
/// use store::{KeyValueStore, StoreBuilder, StrategyKind};
///
/// let store = StoreBuilder::new()
///     .with_strategy(StrategyKind::Consistent)
///     .with_replicas(8)
///     .add_node("node1")
///     .add_node("node2")
///     .build()
///     .unwrap();
/// assert_eq!(store.node_servers().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    config: StoreConfig,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.config.replicas = replicas;
        self
    }

    pub fn with_partitioner(mut self, partitioner: PartitionerKind) -> Self {
        self.config.partitioner = partitioner;
        self
    }

    pub fn add_node(mut self, name: impl Into<String>) -> Self {
        self.config.nodes.push(name.into());
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn build(&self) -> Result<Box<dyn KeyValueStore>> {
        self.config.build()
    }

    pub fn build_shared(&self) -> Result<SharedStore> {
        self.config.build_shared()
    }
}
