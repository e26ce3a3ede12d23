//! BLAKE3 partitioner implementation.

use crate::digest::Digest;
use crate::partitioner::traits::Partitioner;

/// Cryptographic partitioner producing 256-bit digests (64 hex characters).
#[derive(Clone, Debug, Default)]
pub struct Blake3Partitioner;

impl Partitioner for Blake3Partitioner {
    fn digest(&self, input: &str) -> Digest {
        Digest::from_hex(::blake3::hash(input.as_bytes()).to_hex().as_str())
    }

    fn name(&self) -> &'static str {
        "Blake3Partitioner"
    }
}
