//! xxh3 partitioner implementation.

use crate::digest::Digest;
use crate::partitioner::traits::Partitioner;
use xxhash_rust::xxh3::xxh3_128;

/// Fast non-cryptographic partitioner producing 128-bit digests
/// (32 hex characters).
#[derive(Clone, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    fn digest(&self, input: &str) -> Digest {
        Digest::from_hex(format!("{:032x}", xxh3_128(input.as_bytes())))
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
