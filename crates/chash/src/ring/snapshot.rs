//! Immutable ring table.
//!
//! A [`RingSnapshot`] is the sorted merge of every node's replica points at
//! one instant. It is built once, published, and never modified; mutations
//! build a replacement instead.
//!
//! # Layout
//!
//! ```text
//! nodes:  [ A, B, C ]                                          sorted by seed
//! hashes: [ -2113699933, -957092028, 32591339, 1601982441 ]    ascending
//! owners: [ 1,           0,          2,        0          ]    index into nodes
//! ```
//!
//! Points on the same hash are ordered by their node's seed, so two tables
//! built from the same nodes are identical whatever order the nodes were
//! added in. The ring is circular only through index arithmetic: a query
//! past the largest hash wraps to index 0.

use std::sync::Arc;

use crate::point::{Point, ReplicaSet};
use crate::ring::iter::Permutation;

/// Sorted, immutable table of every replica point on the ring.
#[derive(Debug, Clone)]
pub struct RingSnapshot<T> {
    nodes: Box<[T]>,
    hashes: Box<[i32]>,
    owners: Box<[u32]>,
}

impl<T> Default for RingSnapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> RingSnapshot<T> {
    /// A table with no points. Every lookup against it yields `None`.
    pub fn empty() -> Self {
        Self {
            nodes: Box::new([]),
            hashes: Box::new([]),
            owners: Box::new([]),
        }
    }

    /// Number of points in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// True if no node owns any point.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Number of distinct nodes owning at least one point.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in the table, ordered by seed.
    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    /// Point hashes in ascending order.
    pub fn hashes(&self) -> &[i32] {
        &self.hashes
    }

    /// Owner of the point at `idx`.
    ///
    /// # Panics
    ///
    /// If `idx >= self.len()`.
    #[inline]
    pub fn owner(&self, idx: usize) -> &T {
        &self.nodes[self.owners[idx] as usize]
    }

    /// Every point in ring order.
    pub fn points(&self) -> impl Iterator<Item = Point<&T>> + '_ {
        self.hashes
            .iter()
            .zip(self.owners.iter())
            .map(move |(&h, &o)| Point::new(h, &self.nodes[o as usize]))
    }

    /// Index of the point responsible for `query`.
    ///
    /// That is the first point at or above `query`, wrapping to the lowest
    /// point when `query` is past the end of the table. Of several points on
    /// the same hash, the first in table order is responsible.
    pub fn index(&self, query: i32) -> Option<usize> {
        if self.hashes.is_empty() {
            return None;
        }
        let idx = self.hashes.partition_point(|&h| h < query);
        Some(idx % self.hashes.len())
    }

    /// Owner of the point responsible for `query`.
    pub fn lookup(&self, query: i32) -> Option<&T> {
        self.index(query).map(|idx| self.owner(idx))
    }

    /// Number of points owned by the node at `node` in [`nodes`](Self::nodes).
    pub(crate) fn points_of(&self, node: usize) -> usize {
        self.owners.iter().filter(|&&o| o as usize == node).count()
    }

    /// Node index `step` points clockwise from `start`.
    #[inline]
    pub(crate) fn owner_index_at(&self, start: usize, step: usize) -> usize {
        self.owners[(start + step) % self.owners.len()] as usize
    }
}

impl<T: Clone> RingSnapshot<T> {
    /// Merge the replica sets of every node into a sorted table.
    ///
    /// Each set must belong to a different node. Cost is O(k log k) in the
    /// total number of points; each node is cloned once.
    pub fn build<'a, I>(sets: I) -> Self
    where
        T: 'a,
        I: IntoIterator<Item = &'a ReplicaSet<T>>,
    {
        let mut sets: Vec<&ReplicaSet<T>> = sets.into_iter().filter(|s| !s.is_empty()).collect();
        sets.sort_by(|a, b| a.seed().cmp(b.seed()));

        // Node indexes follow seed order, so sorting (hash, index) breaks
        // hash ties by seed.
        let mut all: Vec<(i32, u32)> = Vec::with_capacity(sets.iter().map(|s| s.len()).sum());
        for (idx, set) in sets.iter().enumerate() {
            all.extend(set.hashes().iter().map(|&h| (h, idx as u32)));
        }
        all.sort_unstable();

        Self {
            nodes: sets.iter().map(|s| s.owner().clone()).collect(),
            hashes: all.iter().map(|&(h, _)| h).collect(),
            owners: all.iter().map(|&(_, o)| o).collect(),
        }
    }

    /// Every live node, each exactly once, in the order a clockwise walk from
    /// `query` first meets them.
    ///
    /// The walk keeps `self` alive for as long as the permutation exists, so
    /// it stays consistent even if the ring it came from is mutated.
    pub fn list(self: &Arc<Self>, query: i32) -> Permutation<T> {
        Permutation::new(Arc::clone(self), self.index(query))
    }
}

impl<T: PartialEq> RingSnapshot<T> {
    /// Number of points `node` owns.
    pub fn replicas_of(&self, node: &T) -> usize {
        match self.nodes.iter().position(|n| n == node) {
            Some(idx) => self.points_of(idx),
            None => 0,
        }
    }
}
