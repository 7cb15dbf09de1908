//! Consistent hashing ring.
//!
//! Maps caller-defined nodes onto a circular 32-bit hash space so that keys
//! route deterministically to an owner, and adding, removing or re-weighting
//! a node only moves a small, predictable share of keys.
//!
//! This crate provides:
//! - SHA-256 based digests for replica and query points
//! - Per-node replica point sets with weighting by replica count
//! - Immutable ring snapshots swapped in whole, so readers never wait on a rebuild
//! - Deduplicating clockwise node permutations
//!
//! Hashing is for distribution only and offers no security guarantees.

pub mod config;
pub mod digest;
pub mod error;
pub mod hash;
pub mod point;
pub mod ring;

pub use config::RingConfig;
pub use digest::digest;
pub use error::{Error, Result};
pub use hash::{NodeHash, ToStringHash};
pub use point::{Point, ReplicaSet};
pub use ring::{ConsistentHash, Iter, Permutation, RingBuilder, RingSnapshot};
