//! Core partitioner trait definitions.

use crate::digest::Digest;

/// A partitioner converts strings into digests for placement on the hash ring.
///
/// The same partitioner places both virtual nodes and keys. Partitioners are
/// stateless and thread-safe, allowing concurrent digest generation without
/// synchronization overhead.
pub trait Partitioner: Send + Sync + 'static {
    /// Hashes `input` into a ring position.
    ///
    /// Must be pure: equal inputs always yield equal digests, and every
    /// digest has the same width.
    fn digest(&self, input: &str) -> Digest;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
