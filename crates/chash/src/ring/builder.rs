//! Fluent construction of a populated ring.

use std::fmt::Display;
use std::hash::Hash;

use crate::config::{RingConfig, DEFAULT_REPLICAS};
use crate::hash::{NodeHash, ToStringHash};
use crate::ring::consistent::ConsistentHash;

/// Builder for a [`ConsistentHash`] with an initial set of nodes.
///
/// All queued nodes are placed with a single table rebuild.
///
/// # Example
///
/// ```rust
/// use chash::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_replicas(8)
///     .add_node("a")
///     .add_node_with_replicas("b", 16)
///     .build();
/// assert_eq!(ring.count_all_points(), 24);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder<T, H = ToStringHash> {
    hash: H,
    default_replicas: u32,
    nodes: Vec<(T, Option<u32>)>,
}

impl<T> RingBuilder<T, ToStringHash>
where
    T: Clone + Eq + Hash + Display,
{
    /// Builder seeding nodes by their `Display` output, 100 replicas each.
    pub fn new() -> Self {
        Self {
            hash: ToStringHash,
            default_replicas: DEFAULT_REPLICAS,
            nodes: Vec::new(),
        }
    }
}

impl<T> Default for RingBuilder<T, ToStringHash>
where
    T: Clone + Eq + Hash + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H> RingBuilder<T, H>
where
    T: Clone + Eq + Hash,
    H: NodeHash<T>,
{
    /// Replace the node hash.
    pub fn with_hash<H2: NodeHash<T>>(self, hash: H2) -> RingBuilder<T, H2> {
        RingBuilder {
            hash,
            default_replicas: self.default_replicas,
            nodes: self.nodes,
        }
    }

    /// Replica count for nodes added without one.
    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.default_replicas = replicas;
        self
    }

    /// Take the default replica count from `config`.
    pub fn with_config(mut self, config: &RingConfig) -> Self {
        self.default_replicas = config.default_replicas;
        self
    }

    /// Queue `node` with the default replica count.
    pub fn add_node(mut self, node: T) -> Self {
        self.nodes.push((node, None));
        self
    }

    /// Queue `node` with an explicit replica count.
    pub fn add_node_with_replicas(mut self, node: T, replicas: u32) -> Self {
        self.nodes.push((node, Some(replicas)));
        self
    }

    /// Build the ring.
    pub fn build(self) -> ConsistentHash<T, H> {
        let default_replicas = self.default_replicas;
        let ring = ConsistentHash::with_hash_and_replicas(self.hash, default_replicas);
        if !self.nodes.is_empty() {
            ring.add_all_with_replicas(
                self.nodes
                    .into_iter()
                    .map(|(node, replicas)| (node, replicas.unwrap_or(default_replicas))),
            );
        }
        ring
    }
}
