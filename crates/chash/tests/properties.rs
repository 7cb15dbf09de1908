//! Property tests for ring routing.

use std::collections::HashSet;

use chash::ConsistentHash;
use proptest::prelude::*;

fn ring_of(nodes: &HashSet<u16>, replicas: u32) -> ConsistentHash<u16> {
    let ring = ConsistentHash::with_replicas(replicas);
    ring.add_all(nodes.iter().copied());
    ring
}

proptest! {
    /// Property: lookups are stable without mutation.
    #[test]
    fn prop_deterministic_lookup(
        nodes in prop::collection::hash_set(any::<u16>(), 1..16),
        query in any::<i32>(),
    ) {
        let ring = ring_of(&nodes, 8);
        let first = ring.lookup(query);
        prop_assert!(first.is_some());
        prop_assert_eq!(ring.lookup(query), first);
    }

    /// Property: every permutation contains every node exactly once.
    #[test]
    fn prop_list_is_permutation(
        nodes in prop::collection::hash_set(any::<u16>(), 0..16),
        query in any::<i32>(),
    ) {
        let ring = ring_of(&nodes, 4);
        let order: Vec<u16> = ring.list(query).into_iter().collect();
        let distinct: HashSet<u16> = order.iter().copied().collect();
        prop_assert_eq!(order.len(), nodes.len());
        prop_assert_eq!(distinct, nodes);
    }

    /// Property: point count is the sum of replica counts.
    #[test]
    fn prop_point_count(
        weights in prop::collection::hash_map(any::<u16>(), 0u32..20, 0..16),
    ) {
        let ring: ConsistentHash<u16> = ConsistentHash::new();
        ring.add_all_with_replicas(weights.clone());
        let expected: u32 = weights.values().sum();
        prop_assert_eq!(ring.count_all_points(), expected as usize);
    }

    /// Property: removing a node only reroutes the queries it owned.
    #[test]
    fn prop_minimal_disruption(
        nodes in prop::collection::hash_set(any::<u16>(), 2..12),
        queries in prop::collection::vec(any::<i32>(), 1..64),
        pick in any::<prop::sample::Index>(),
    ) {
        let ring = ring_of(&nodes, 16);
        let victim = *pick.get(&nodes.iter().copied().collect::<Vec<_>>());
        let before: Vec<_> = queries.iter().map(|&q| ring.lookup(q)).collect();

        ring.remove(&victim);
        for (q, old) in queries.iter().zip(before) {
            let now = ring.lookup(*q);
            prop_assert_ne!(now, Some(victim));
            if old != Some(victim) {
                prop_assert_eq!(now, old);
            }
        }
    }
}
