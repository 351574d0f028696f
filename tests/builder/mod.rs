use crate::util::{init_logger, set::Reference};
use pavl::{
    avltree::AVLTree,
    builder::{build_parallel, build_parallel_with_stats, build_partition, BuildError},
    util::random::random_keys,
    Key,
};
use proptest::prelude::*;
use std::{cmp::Ordering, time::Duration};

fn keys(strs: &[&str]) -> Vec<Key> {
    strs.iter().map(|s| Key::from(*s)).collect()
}

#[test]
fn test_two_partitions() {
    init_logger();

    let input = keys(&["b", "a", "c", "d"]);

    let left: AVLTree<Key> = build_partition(&input[..2]);
    let right: AVLTree<Key> = build_partition(&input[2..]);
    assert!(left.iter().eq(keys(&["a", "b"]).iter()));
    assert!(right.iter().eq(keys(&["c", "d"]).iter()));

    let (tree, stats): (AVLTree<Key>, _) = build_parallel_with_stats(&input, 2).unwrap();
    assert!(tree.iter().eq(keys(&["a", "b", "c", "d"]).iter()));
    assert_eq!(stats.workers, 2);
    assert_eq!(stats.merge_levels, 1);
}

#[test]
fn test_empty_input() {
    let input: Vec<Key> = Vec::new();

    let (tree, stats): (AVLTree<Key>, _) = build_parallel_with_stats(&input, 4).unwrap();
    assert!(tree.is_empty());
    assert_eq!(stats.workers, 0);
    assert_eq!(stats.merge_levels, 0);
    assert_eq!(stats.busy, Duration::ZERO);
}

#[test]
fn test_invalid_partition_count() {
    let input = keys(&["a", "b"]);

    assert_eq!(
        build_parallel::<_, AVLTree<Key>>(&input, 0).unwrap_err(),
        BuildError::InvalidPartitionCount { partitions: 0 }
    );
    assert_eq!(
        build_parallel::<Key, AVLTree<Key>>(&[], 0).unwrap_err(),
        BuildError::InvalidPartitionCount { partitions: 0 }
    );
}

#[test]
fn test_merge_levels() {
    let input: Vec<u64> = random_keys(1000, 1);

    for (partitions, levels) in [(1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4)] {
        let (tree, stats): (AVLTree<u64>, _) =
            build_parallel_with_stats(&input, partitions).unwrap();

        assert_eq!(stats.workers, partitions);
        assert_eq!(stats.merge_levels, levels, "{} partitions", partitions);
        assert!(stats.busy > Duration::ZERO);
        assert!(tree.is_balanced());
    }
}

#[test]
fn test_more_partitions_than_keys() {
    let input = keys(&["z", "y", "x"]);

    let tree: AVLTree<Key> = build_parallel(&input, 8).unwrap();
    assert!(tree.iter().eq(keys(&["x", "y", "z"]).iter()));
}

#[test]
fn test_parallel_matches_reference() {
    init_logger();

    let input: Vec<Key> = random_keys(20_000, 3);
    let reference: Reference<Key> = build_partition(&input);

    for partitions in 1..=8 {
        let tree: AVLTree<Key> = build_parallel(&input, partitions).unwrap();

        assert!(tree.iter().eq(reference.keys()), "{} partitions", partitions);
        assert_eq!(tree.force(), reference.keys().count());
        assert!(tree.is_balanced());
    }
}

#[test]
fn test_reference_set_as_builder_target() {
    let input: Vec<u64> = random_keys(500, 9);

    let parallel: Reference<u64> = build_parallel(&input, 3).unwrap();
    let sequential: Reference<u64> = build_partition(&input);
    assert_eq!(parallel, sequential);
}

/// A key whose comparison panics when it meets the poisoned value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragile(pub u32);

pub const POISON: u32 = 13;

impl PartialOrd for Fragile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fragile {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == POISON || other.0 == POISON {
            panic!("corrupt key");
        }
        self.0.cmp(&other.0)
    }
}

#[test]
fn test_worker_failure() {
    // partition 1 of 2 holds the poisoned key next to another key
    let input: Vec<Fragile> = [1, 2, 3, 4, POISON, 5].into_iter().map(Fragile).collect();

    let result = build_parallel::<_, AVLTree<Fragile>>(&input, 2);
    assert_eq!(result.unwrap_err(), BuildError::WorkerFailure { partition: 1 });
}

/// A key that takes `CLONE_DELAY` to clone, so every task holding one has a known
/// minimum running time.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slow(pub u32);

pub const CLONE_DELAY: Duration = Duration::from_millis(5);

impl Clone for Slow {
    fn clone(&self) -> Self {
        std::thread::sleep(CLONE_DELAY);
        Slow(self.0)
    }
}

#[test]
fn test_busy_time_sums_every_task() {
    // each of the 4 workers clones its single key once
    let input: Vec<Slow> = (0..4).map(Slow).collect();

    let (tree, stats): (AVLTree<Slow>, _) = build_parallel_with_stats(&input, 4).unwrap();
    assert_eq!(tree.len(), 4);
    assert!(stats.busy >= CLONE_DELAY * 4, "busy {:?}", stats.busy);
}

#[test]
fn test_merge_failure() {
    // one key per partition: the workers never compare, the union does
    let input = vec![Fragile(1), Fragile(POISON)];

    let result = build_parallel::<_, AVLTree<Fragile>>(&input, 2);
    assert_eq!(result.unwrap_err(), BuildError::MergeFailure { level: 1 });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn partitioning_never_changes_content(
        input in prop::collection::vec(any::<u16>(), 0..500),
        partitions in 1usize..10,
    ) {
        let sequential: AVLTree<u16> = build_parallel(&input, 1).unwrap();
        let parallel: AVLTree<u16> = build_parallel(&input, partitions).unwrap();

        prop_assert!(parallel.iter().eq(sequential.iter()));
        prop_assert!(parallel.is_balanced());
        prop_assert!(parallel.is_ordered());
    }
}
