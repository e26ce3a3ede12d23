//! Consistent hash ring implementation.
//!
//! The ring manages virtual node positions and the partitions they own, and
//! provides successor lookups for finding the owner of a key.

pub mod partition;
#[allow(clippy::module_inception)]
pub mod ring;

pub use partition::Partition;
pub use ring::HashRing;

/// Alias for the main ring type (used by lib.rs).
pub type Ring = HashRing;
