//! Per-virtual-node key storage.
//!
//! A partition buckets its key/value pairs by key digest so that handing a
//! slice of the ring to a neighbour is an ordered-map split rather than a
//! scan over every key.

use crate::digest::Digest;
use std::collections::BTreeMap;

type Buckets = BTreeMap<Digest, BTreeMap<String, String>>;

/// The key/value pairs owned by one virtual node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    buckets: Buckets,
    len: usize,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// `digest` must be the ring digest of `key`.
    pub fn insert(&mut self, digest: Digest, key: String, value: String) -> Option<String> {
        let previous = self.buckets.entry(digest).or_default().insert(key, value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn get(&self, digest: &Digest, key: &str) -> Option<&str> {
        self.buckets.get(digest)?.get(key).map(String::as_str)
    }

    /// Iterates `(digest, key, value)` in digest order.
    pub fn iter(&self) -> impl Iterator<Item = (&Digest, &str, &str)> {
        self.buckets.iter().flat_map(|(digest, bucket)| {
            bucket
                .iter()
                .map(move |(key, value)| (digest, key.as_str(), value.as_str()))
        })
    }

    /// Removes and returns every entry whose digest lies outside the
    /// clockwise arc `(from, to]`; the entries on the arc stay.
    pub fn split_off_outside(&mut self, from: &Digest, to: &Digest) -> Partition {
        let outside = if from < to {
            let mut outside = take_above(&mut self.buckets, to);
            outside.append(&mut take_through(&mut self.buckets, from));
            outside
        } else {
            // The arc wraps: keep (from, max] and [min, to], hand back (to, from].
            let mut between = take_above(&mut self.buckets, to);
            self.buckets.append(&mut take_above(&mut between, from));
            between
        };
        let outside = Partition::from_buckets(outside);
        self.len -= outside.len;
        outside
    }

    /// Moves every entry of `other` into `self`.
    pub fn merge(&mut self, other: Partition) {
        for (digest, bucket) in other.buckets {
            let target = self.buckets.entry(digest).or_default();
            let before = target.len();
            target.extend(bucket);
            self.len += target.len() - before;
        }
    }

    pub(crate) fn digests(&self) -> impl Iterator<Item = (&Digest, usize)> {
        self.buckets.iter().map(|(digest, bucket)| (digest, bucket.len()))
    }

    fn from_buckets(buckets: Buckets) -> Self {
        let len = buckets.values().map(BTreeMap::len).sum();
        Self { buckets, len }
    }
}

/// Splits off the buckets strictly above `digest`.
fn take_above(buckets: &mut Buckets, digest: &Digest) -> Buckets {
    let mut above = buckets.split_off(digest);
    if let Some(at) = above.remove(digest) {
        buckets.insert(digest.clone(), at);
    }
    above
}

/// Splits off the buckets at or below `digest`.
fn take_through(buckets: &mut Buckets, digest: &Digest) -> Buckets {
    let mut rest = buckets.split_off(digest);
    let at = rest.remove(digest);
    let mut through = std::mem::replace(buckets, rest);
    if let Some(at) = at {
        through.insert(digest.clone(), at);
    }
    through
}
