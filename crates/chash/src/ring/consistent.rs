//! The live ring.
//!
//! # Concurrency
//!
//! Mutators (`add*`, `remove`) are serialized by a mutex over the node map.
//! Each one rebuilds a complete [`RingSnapshot`] outside of any reader-facing
//! lock, then publishes it by swapping one `Arc` under a
//! [`ShardedLock`]. Readers (`lookup*`, `list*`, `count_all_points`) never
//! touch the mutex: they take the read side of the sharded lock just long
//! enough to clone the `Arc`, and it is only ever write-held for the swap.
//! A reader therefore sees either the table from before a mutation or the
//! one after it, never a partially built one.
//!
//! A replaced table is freed as soon as its last `Arc` goes away: by the
//! writer right after the swap, or by whichever reader or permutation held
//! it last.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::hash::Hash;
use std::sync::{Arc, PoisonError};

use crossbeam::sync::ShardedLock;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::{RingConfig, DEFAULT_REPLICAS};
use crate::digest::digest;
use crate::error::Result;
use crate::hash::{NodeHash, ToStringHash};
use crate::point::ReplicaSet;
use crate::ring::iter::Permutation;
use crate::ring::snapshot::RingSnapshot;

type PointSets<T> = HashMap<T, ReplicaSet<T>>;

/// A consistent hash ring over nodes of type `T`.
///
/// Nodes are placed on a 32-bit ring at several replica points each. A query
/// is routed to the owner of the first point at or clockwise of its hash.
/// Adding, removing or re-weighting one node only moves the queries that
/// land on the points it gains or loses.
///
/// Replica points are seeded by the [`NodeHash`] given at construction
/// (the node's `Display` output by default). That function **must be
/// injective**: distinct nodes with the same seed collide on every point.
///
/// The ring is safe to share between threads; see the module docs.
///
/// # Example
///
/// ```rust
/// use chash::ConsistentHash;
///
/// let ring = ConsistentHash::new();
/// ring.add_all(["cache-a", "cache-b", "cache-c"]);
/// assert_eq!(ring.count_all_points(), 300);
///
/// let owner = ring.lookup_str("user:42").unwrap();
/// assert!(["cache-a", "cache-b", "cache-c"].contains(&owner));
/// ```
pub struct ConsistentHash<T, H = ToStringHash> {
    items: Mutex<PointSets<T>>,
    table: ShardedLock<Arc<RingSnapshot<T>>>,
    default_replicas: u32,
    hash: H,
}

impl<T> ConsistentHash<T, ToStringHash>
where
    T: Clone + Eq + Hash + Display,
{
    /// Empty ring seeding nodes by their `Display` output, with 100 replicas
    /// per node.
    pub fn new() -> Self {
        Self::with_hash_and_replicas(ToStringHash, DEFAULT_REPLICAS)
    }

    /// Empty ring seeding nodes by their `Display` output.
    ///
    /// A `default_replicas` of zero makes [`add`](Self::add) behave like
    /// [`remove`](Self::remove).
    pub fn with_replicas(default_replicas: u32) -> Self {
        Self::with_hash_and_replicas(ToStringHash, default_replicas)
    }
}

impl<T> Default for ConsistentHash<T, ToStringHash>
where
    T: Clone + Eq + Hash + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H> ConsistentHash<T, H>
where
    T: Clone + Eq + Hash,
    H: NodeHash<T>,
{
    /// Empty ring with a custom node hash and 100 replicas per node.
    pub fn with_hash(hash: H) -> Self {
        Self::with_hash_and_replicas(hash, DEFAULT_REPLICAS)
    }

    /// Empty ring with a custom node hash and default replica count.
    pub fn with_hash_and_replicas(hash: H, default_replicas: u32) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            table: ShardedLock::new(Arc::new(RingSnapshot::empty())),
            default_replicas,
            hash,
        }
    }

    /// Empty ring configured from a validated [`RingConfig`].
    pub fn from_config(hash: H, config: &RingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_hash_and_replicas(hash, config.default_replicas))
    }

    /// Replica count used by [`add`](Self::add).
    pub fn default_replicas(&self) -> u32 {
        self.default_replicas
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Add `node` with the default replica count.
    pub fn add(&self, node: T) {
        self.add_with_replicas(node, self.default_replicas);
    }

    /// Add `node` with `replicas` points, replacing any points it had.
    ///
    /// Zero replicas removes the node. Changing the count of a present node
    /// keeps its first `min(old, new)` points where they were.
    pub fn add_with_replicas(&self, node: T, replicas: u32) {
        let update = self.prepare(node, replicas);

        let mut items = self.items.lock();
        self.apply(&mut items, update);
        self.refresh_table(&items);
    }

    /// Add every node with the default replica count, rebuilding the table
    /// once.
    pub fn add_all<I>(&self, nodes: I)
    where
        I: IntoIterator<Item = T>,
    {
        let replicas = self.default_replicas;
        self.add_all_with_replicas(nodes.into_iter().map(|node| (node, replicas)));
    }

    /// Add every `(node, replicas)` pair, rebuilding the table once.
    ///
    /// Accepts any map from node to replica count. A later entry for the
    /// same node wins; zero replicas removes the node.
    pub fn add_all_with_replicas<I>(&self, nodes: I)
    where
        I: IntoIterator<Item = (T, u32)>,
    {
        let updates: Vec<_> = nodes
            .into_iter()
            .map(|(node, replicas)| self.prepare(node, replicas))
            .collect();
        trace!(batch = updates.len(), "applying ring batch");

        let mut items = self.items.lock();
        for update in updates {
            self.apply(&mut items, update);
        }
        self.refresh_table(&items);
    }

    /// Remove `node` and all its points. Returns `false` if it was absent,
    /// in which case the published table is left untouched.
    pub fn remove(&self, node: &T) -> bool {
        let mut items = self.items.lock();
        if items.remove(node).is_none() {
            return false;
        }
        debug!(node = %self.hash.hash(node), "removed node from ring");
        self.refresh_table(&items);
        true
    }

    /// Compute the new points for `node`. Runs the caller's hash, so it is
    /// done before the map is touched.
    fn prepare(&self, node: T, replicas: u32) -> Update<T> {
        if replicas == 0 {
            return Update::Remove(node);
        }
        let seed = self.hash.hash(&node);
        debug!(node = %seed, replicas, "placed node on ring");
        let set = ReplicaSet::new(node.clone(), seed, replicas);
        Update::Place(node, set)
    }

    fn apply(&self, items: &mut PointSets<T>, update: Update<T>) {
        match update {
            Update::Place(node, set) => {
                items.insert(node, set);
            }
            Update::Remove(node) => {
                if items.remove(&node).is_some() {
                    debug!(node = %self.hash.hash(&node), "removed node from ring");
                }
            }
        }
    }

    /// Build a table from `items` and publish it. Callers hold the lock.
    fn refresh_table(&self, items: &PointSets<T>) {
        let table = Arc::new(RingSnapshot::build(items.values()));
        debug!(
            points = table.len(),
            nodes = table.node_count(),
            "published ring table"
        );

        let old = {
            let mut current = self.table.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, table)
        };
        // Dropped outside the write guard.
        drop(old);
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Run `f` against the currently published table.
    fn with_table<R>(&self, f: impl FnOnce(&Arc<RingSnapshot<T>>) -> R) -> R {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        f(&*table)
    }

    /// The currently published table.
    ///
    /// Useful for running several queries against one consistent view.
    pub fn snapshot(&self) -> Arc<RingSnapshot<T>> {
        self.with_table(|table| Arc::clone(table))
    }

    /// Owner of the pre-hashed query point `query`, or `None` if the ring is
    /// empty.
    ///
    /// For a fixed ring the same query always returns the same node. After a
    /// mutation it keeps returning that node unless the node was removed or
    /// the query now falls on one of the changed points.
    pub fn lookup(&self, query: i32) -> Option<T> {
        self.with_table(|table| table.lookup(query).cloned())
    }

    /// Digest `query` and return its owner.
    pub fn lookup_str(&self, query: &str) -> Option<T> {
        self.lookup(digest(query))
    }

    /// All live nodes, each once, in clockwise order of first appearance
    /// from `query`.
    ///
    /// Nodes with more replicas tend to appear earlier. The permutation is
    /// bound to the table current at the time of the call.
    pub fn list(&self, query: i32) -> Permutation<T> {
        self.snapshot().list(query)
    }

    /// Digest `query` and return the node permutation for it.
    pub fn list_str(&self, query: &str) -> Permutation<T> {
        self.list(digest(query))
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Total number of replica points in the published table.
    pub fn count_all_points(&self) -> usize {
        self.with_table(|table| table.len())
    }

    /// Number of nodes in the published table.
    pub fn node_count(&self) -> usize {
        self.with_table(|table| table.node_count())
    }

    /// True if no node is registered.
    pub fn is_empty(&self) -> bool {
        self.with_table(|table| table.is_empty())
    }

    /// True if `node` owns points in the published table.
    pub fn contains(&self, node: &T) -> bool {
        self.replicas_of(node) > 0
    }

    /// Number of points `node` owns in the published table.
    pub fn replicas_of(&self, node: &T) -> u32 {
        self.with_table(|table| table.replicas_of(node) as u32)
    }
}

/// A per-node change computed ahead of taking the lock.
enum Update<T> {
    Place(T, ReplicaSet<T>),
    Remove(T),
}

impl<T, H> fmt::Debug for ConsistentHash<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = Arc::clone(&*self.table.read().unwrap_or_else(PoisonError::into_inner));
        f.debug_struct("ConsistentHash")
            .field("default_replicas", &self.default_replicas)
            .field("nodes", &table.node_count())
            .field("points", &table.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ring_is_empty() {
        let ring: ConsistentHash<&str> = ConsistentHash::new();
        assert!(ring.is_empty());
        assert_eq!(ring.count_all_points(), 0);
        assert_eq!(ring.lookup(0), None);
        assert_eq!(ring.lookup_str("key"), None);
        assert_eq!(ring.list(0).iter().count(), 0);
    }

    #[test]
    fn test_add_uses_default_replicas() {
        let ring = ConsistentHash::with_replicas(7);
        ring.add("a");
        assert_eq!(ring.count_all_points(), 7);
        assert_eq!(ring.replicas_of(&"a"), 7);
        assert_eq!(ring.default_replicas(), 7);
    }

    #[test]
    fn test_add_replaces_points() {
        let ring = ConsistentHash::new();
        ring.add_with_replicas("a", 10);
        ring.add_with_replicas("a", 3);
        assert_eq!(ring.count_all_points(), 3);
        assert_eq!(ring.node_count(), 1);
    }

    #[test]
    fn test_zero_replicas_removes() {
        let ring = ConsistentHash::new();
        ring.add("a");
        ring.add_with_replicas("a", 0);
        assert!(ring.is_empty());
        assert!(!ring.contains(&"a"));
    }

    #[test]
    fn test_remove_absent_keeps_table() {
        let ring = ConsistentHash::new();
        ring.add("a");
        let before = ring.snapshot();
        assert!(!ring.remove(&"b"));
        assert!(Arc::ptr_eq(&before, &ring.snapshot()));
    }

    #[test]
    fn test_points_match_digest() {
        let ring = ConsistentHash::with_replicas(2);
        ring.add("A");
        let snap = ring.snapshot();
        let mut expected = vec![digest("A:0"), digest("A:1")];
        expected.sort();
        assert_eq!(snap.hashes(), expected.as_slice());
        assert_eq!(ring.lookup(digest("A:1")), Some("A"));
    }

    #[test]
    fn test_custom_hash() {
        let ring: ConsistentHash<u32, _> =
            ConsistentHash::with_hash_and_replicas(|n: &u32| format!("node-{}", n), 1);
        ring.add(1);
        assert_eq!(ring.snapshot().hashes(), &[digest("node-1:0")]);
    }

    #[test]
    fn test_from_config() {
        let config = RingConfig::new(5);
        let ring = ConsistentHash::from_config(ToStringHash, &config).unwrap();
        ring.add("a");
        assert_eq!(ring.count_all_points(), 5);

        assert!(ConsistentHash::<&str>::from_config(ToStringHash, &RingConfig::new(0)).is_err());
    }

    #[test]
    fn test_permutation_survives_mutation() {
        let ring = ConsistentHash::with_replicas(10);
        ring.add_all(["a", "b", "c"]);
        let perm = ring.list_str("key");
        ring.remove(&"b");
        assert_eq!(perm.iter().count(), 3);
        assert_eq!(ring.list_str("key").iter().count(), 2);
    }

    #[test]
    fn test_debug_output() {
        let ring = ConsistentHash::with_replicas(2);
        ring.add("a");
        let out = format!("{:?}", ring);
        assert!(out.contains("points: 2"));
        assert!(out.contains("nodes: 1"));
    }
}
