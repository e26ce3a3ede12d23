//! Ring digests.
//!
//! A digest is the fixed-width, lowercase hex rendering of a hash function
//! output. Because every digest produced by one partitioner has the same
//! width, comparing the strings compares the underlying numbers, which is
//! the order the ring is laid out in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the ring.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wraps an already hex-encoded hash.
    ///
    /// Digests placed on the same ring must share one width, otherwise the
    /// lexicographic order no longer matches the numeric one.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Digest(hex.into())
    }

    /// Hex-encodes raw hash output.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Digest(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of hex characters.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// True if `self` lies on the clockwise arc `(from, to]`.
    ///
    /// When `from == to` the arc covers the whole ring, which is the range a
    /// lone virtual node owns.
    pub fn in_arc(&self, from: &Digest, to: &Digest) -> bool {
        if from < to {
            from < self && self <= to
        } else {
            self > from || self <= to
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
