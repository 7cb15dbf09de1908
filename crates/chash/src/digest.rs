//! Query and replica digests.
//!
//! Node seeds and query strings are pushed through SHA-256 so that even a
//! poorly distributed input (sequential host names, small integers) lands
//! uniformly on the 32-bit ring. The digest is then folded down to four
//! bytes:
//!
//! ```text
//! out[i] = d[i] ^ (d[i + 4] + d[i + 8] + d[i + 12])   for i in 0..4
//! point  = i32::from_be_bytes(out)
//! ```
//!
//! Byte arithmetic wraps, every byte is treated as unsigned, and the result
//! is read big-endian. The fold must stay bit-for-bit stable: changing it
//! relocates every point of every deployed ring.

use sha2::{Digest, Sha256};

/// Fold the SHA-256 digest of `bytes` into a ring position.
pub fn digest_bytes(bytes: &[u8]) -> i32 {
    let d = Sha256::digest(bytes);

    let mut folded = [0u8; 4];
    for (i, out) in folded.iter_mut().enumerate() {
        let mix = d[i + 4].wrapping_add(d[i + 8]).wrapping_add(d[i + 12]);
        *out = d[i] ^ mix;
    }
    i32::from_be_bytes(folded)
}

/// Fold the SHA-256 digest of the UTF-8 encoding of `s` into a ring position.
#[inline]
pub fn digest(s: &str) -> i32 {
    digest_bytes(s.as_bytes())
}

/// Ring position of replica `index` for a node whose seed is `seed`.
///
/// The replica key is `"{seed}:{index}"`, so the first `n` points of a node
/// are the same whatever its total replica count.
pub fn replica_digest(seed: &str, index: u32) -> i32 {
    digest(&format!("{}:{}", seed, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(digest(""), 685116738);
        assert_eq!(digest("hello"), 1721994604);
        assert_eq!(digest("world"), 512041834);
        assert_eq!(digest("node1:0"), 32591339);
    }

    #[test]
    fn test_high_bit_set_is_negative() {
        assert_eq!(digest("key1"), -957092028);
        assert_eq!(digest("key2"), -2113699933);
    }

    #[test]
    fn test_utf8_input() {
        assert_eq!(digest("ключ"), -843302025);
        assert_eq!(digest("ключ"), digest_bytes("ключ".as_bytes()));
    }

    #[test]
    fn test_replica_digest_format() {
        assert_eq!(replica_digest("A", 0), 1601982441);
        assert_eq!(replica_digest("A", 1), 1421061240);
        assert_eq!(replica_digest("A", 0), digest("A:0"));
    }

    #[test]
    fn test_deterministic() {
        for key in ["a", "b", "some longer key", ""] {
            assert_eq!(digest(key), digest(key));
        }
    }
}
