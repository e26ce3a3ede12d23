//! Thread-safe store handle.
//!
//! The ring's structural layout changes on every mutating call, so a
//! `SharedStore` guards the whole store with one `RwLock`: `put`, `add_node`
//! and `remove_node` take it exclusively, reads share it.

use crate::strategy::KeyValueStore;
use corelib::{NodeStats, Rebalance, Result};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Cloneable handle to a store shared between threads.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<Box<dyn KeyValueStore>>>,
}

impl SharedStore {
    pub fn new(store: impl KeyValueStore) -> Self {
        Self::from_boxed(Box::new(store))
    }

    pub fn from_boxed(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.inner.write().put(key, value)
    }

    /// Reads `key`, copying the value out so the read lock is released on
    /// return.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.read().get(key)?.map(str::to_string))
    }

    pub fn add_node(&self, name: &str) -> Result<Rebalance> {
        self.inner.write().add_node(name)
    }

    pub fn remove_node(&self, name: &str) -> Result<Rebalance> {
        self.inner.write().remove_node(name)
    }

    pub fn node_servers(&self) -> Vec<NodeStats> {
        self.inner.read().node_servers()
    }

    pub fn locate(&self, key: &str) -> Result<String> {
        self.inner.read().locate(key).map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Runs `f` with shared access to the store.
    pub fn with_read<R>(&self, f: impl FnOnce(&dyn KeyValueStore) -> R) -> R {
        f(self.inner.read().as_ref())
    }
}

impl fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStore")
            .field("strategy", &self.inner.read().name())
            .finish()
    }
}
