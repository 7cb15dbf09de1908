//! Replica points.
//!
//! Each node owns a fixed set of points on the ring, one per replica. A
//! node's points are derived from its seed string alone, so they are
//! recomputed, never edited, when its replica count changes.

use std::cmp::Ordering;
use std::fmt;

use crate::digest::replica_digest;

/// A single position on the ring owned by a node.
///
/// Points order by hash only; the owner does not take part in comparisons.
#[derive(Debug, Clone)]
pub struct Point<T> {
    /// Position on the ring.
    pub hash: i32,
    /// The node this position routes to.
    pub owner: T,
}

impl<T> Point<T> {
    /// Create a point at `hash` owned by `owner`.
    #[inline]
    pub fn new(hash: i32, owner: T) -> Self {
        Self { hash, owner }
    }
}

impl<T> PartialEq for Point<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl<T> Eq for Point<T> {}

impl<T> PartialOrd for Point<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Point<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl<T: fmt::Display> fmt::Display for Point<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point(hash={:08x}, owner={})", self.hash, self.owner)
    }
}

/// Every replica point of one node.
///
/// The seed is kept alongside the hashes: when two nodes land on the same
/// hash, the node with the smaller seed owns it.
#[derive(Debug, Clone)]
pub struct ReplicaSet<T> {
    owner: T,
    seed: String,
    hashes: Box<[i32]>,
}

impl<T> ReplicaSet<T> {
    /// Compute the `count` replica points of `owner`, whose seed string is
    /// `seed`. Point `i` sits at the digest of `"{seed}:{i}"`.
    pub fn new(owner: T, seed: String, count: u32) -> Self {
        let hashes = (0..count).map(|i| replica_digest(&seed, i)).collect();
        Self {
            owner,
            seed,
            hashes,
        }
    }

    /// A set with hand-picked hashes.
    #[cfg(test)]
    pub(crate) fn from_hashes(owner: T, seed: &str, hashes: &[i32]) -> Self {
        Self {
            owner,
            seed: seed.to_string(),
            hashes: hashes.into(),
        }
    }

    /// The node owning these points.
    pub fn owner(&self) -> &T {
        &self.owner
    }

    /// Seed string the points were derived from.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Point hashes, in replica index order.
    pub fn hashes(&self) -> &[i32] {
        &self.hashes
    }

    /// Number of replicas.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// The points, borrowing the owner.
    pub fn points(&self) -> impl Iterator<Item = Point<&T>> + '_ {
        self.hashes.iter().map(move |&h| Point::new(h, &self.owner))
    }
}
