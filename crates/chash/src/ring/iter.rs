//! Node permutations.
//!
//! Walking the ring clockwise from a query point and keeping only the first
//! occurrence of each owner yields a permutation of every live node. Nodes
//! with more replica points are met earlier on average, and a small change
//! to the ring only perturbs the permutation slightly, which makes it a
//! natural fallback order for placement.

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::ring::snapshot::RingSnapshot;

/// A restartable permutation of the ring's nodes.
///
/// Holds the snapshot it was taken from, so every call to
/// [`iter`](Self::iter) replays the same order regardless of later mutations.
#[derive(Debug, Clone)]
pub struct Permutation<T> {
    snapshot: Arc<RingSnapshot<T>>,
    start: Option<usize>,
}

impl<T: Clone> Permutation<T> {
    pub(crate) fn new(snapshot: Arc<RingSnapshot<T>>, start: Option<usize>) -> Self {
        Self { snapshot, start }
    }

    /// Start a fresh walk.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            snapshot: Arc::clone(&self.snapshot),
            start: self.start.unwrap_or(0),
            pos: 0,
            seen: vec![false; self.snapshot.node_count()],
            found: 0,
        }
    }

    /// Number of nodes the walk yields.
    pub fn len(&self) -> usize {
        self.snapshot.node_count()
    }

    /// True if the ring had no nodes.
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

impl<T: Clone> IntoIterator for Permutation<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for &Permutation<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One clockwise walk over a snapshot, skipping owners already yielded.
#[derive(Debug)]
pub struct Iter<T> {
    snapshot: Arc<RingSnapshot<T>>,
    start: usize,
    pos: usize,
    /// Indexed like `RingSnapshot::nodes`.
    seen: Vec<bool>,
    found: usize,
}

impl<T: Clone> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let len = self.snapshot.len();
        // Every node found: the rest of the walk can only repeat them.
        while self.pos < len && self.found < self.seen.len() {
            let node = self.snapshot.owner_index_at(self.start, self.pos);
            self.pos += 1;
            if !self.seen[node] {
                self.seen[node] = true;
                self.found += 1;
                return Some(self.snapshot.nodes()[node].clone());
            }
        }
        self.pos = len;
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.seen.len() - self.found;
        if self.pos >= self.snapshot.len() {
            (0, Some(0))
        } else {
            (remaining.min(1), Some(remaining))
        }
    }
}

impl<T: Clone> FusedIterator for Iter<T> {}
