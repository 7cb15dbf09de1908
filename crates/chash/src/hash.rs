//! Node identity hashing.
//!
//! The ring never inspects nodes directly. It asks a [`NodeHash`] for a
//! string that identifies the node and derives every replica point from that
//! string, which is then rehashed with SHA-256. The string therefore does not
//! need to be uniformly distributed, only unique per node.

use std::fmt::Display;

/// Turns a node into the seed string its replica points are derived from.
///
/// # Injectivity
///
/// Implementations must map distinct nodes to distinct strings. Two nodes
/// that share a seed share every ring position, and whichever is registered
/// last silently takes over the other's points in the merged table. The ring
/// does not detect this.
///
/// Any `Fn(&T) -> String` closure is a `NodeHash<T>`.
pub trait NodeHash<T: ?Sized>: Send + Sync {
    /// Seed string for `node`.
    fn hash(&self, node: &T) -> String;
}

impl<T: ?Sized, F> NodeHash<T> for F
where
    F: Fn(&T) -> String + Send + Sync,
{
    fn hash(&self, node: &T) -> String {
        self(node)
    }
}

/// Seeds a node with its `Display` rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToStringHash;

impl<T: Display + ?Sized> NodeHash<T> for ToStringHash {
    fn hash(&self, node: &T) -> String {
        node.to_string()
    }
}
