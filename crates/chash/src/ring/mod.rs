//! Consistent hash ring implementation.
//!
//! The ring keeps a mutable map from node to replica points and publishes
//! an immutable, sorted [`RingSnapshot`] of all points after every change.
//! Lookups and permutations read the published snapshot only.

pub mod builder;
pub mod consistent;
pub mod iter;
pub mod snapshot;

pub use builder::RingBuilder;
pub use consistent::ConsistentHash;
pub use iter::{Iter, Permutation};
pub use snapshot::RingSnapshot;
