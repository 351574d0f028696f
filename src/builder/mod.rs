//! Partitioned bulk load of a persistent set.
//!
//! `build_parallel` runs in two phases separated by one barrier:
//!
//! 1. one scoped worker per partition folds `insert` over its slice,
//! 2. the partial sets are merged with `union` in a balanced pairwise reduction,
//!    each level running its unions concurrently.
//!
//! Nothing is shared between workers but the read-only input slice.

use crate::set::PersistentSet;
use crossbeam_utils::thread::{self, ScopedJoinHandle};
use log::debug;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid partition count {partitions}: at least one partition is required")]
    InvalidPartitionCount { partitions: usize },
    #[error("build worker for partition {partition} terminated abnormally")]
    WorkerFailure { partition: usize },
    #[error("union task at merge level {level} terminated abnormally")]
    MergeFailure { level: usize },
}

/// What a `build_parallel` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    /// build workers spawned
    pub workers: usize,
    /// levels of the merge reduction
    pub merge_levels: usize,
    /// sum of the time every build and union task spent on its own thread
    pub busy: Duration,
}

/// Split `keys` into `partitions` contiguous slices.
///
/// The first `partitions - 1` slices hold `keys.len() / partitions` keys each, the
/// last one absorbs the remainder.
pub fn partition<K>(keys: &[K], partitions: usize) -> Result<Vec<&[K]>, BuildError> {
    if partitions == 0 {
        return Err(BuildError::InvalidPartitionCount { partitions });
    }

    let chunk = keys.len() / partitions;
    let mut slices = Vec::with_capacity(partitions);
    let mut rest = keys;

    for _ in 1..partitions {
        let (head, tail) = rest.split_at(chunk);
        slices.push(head);
        rest = tail;
    }
    slices.push(rest);

    Ok(slices)
}

/// Fold `insert` over `keys` in order, starting from the empty set.
pub fn build_partition<K, S>(keys: &[K]) -> S
where
    K: Ord + Clone,
    S: PersistentSet<K>,
{
    keys.iter()
        .fold(S::empty(), |set, key| set.insert(key.clone()))
}

/// Build one set from `keys` using `partitions` concurrent workers.
pub fn build_parallel<K, S>(keys: &[K], partitions: usize) -> Result<S, BuildError>
where
    K: Ord + Clone + Sync,
    S: PersistentSet<K> + Send,
{
    build_parallel_with_stats(keys, partitions).map(|(set, _)| set)
}

/// Same as `build_parallel`, also reporting how many workers and merge levels ran.
pub fn build_parallel_with_stats<K, S>(
    keys: &[K],
    partitions: usize,
) -> Result<(S, BuildStats), BuildError>
where
    K: Ord + Clone + Sync,
    S: PersistentSet<K> + Send,
{
    let slices = partition(keys, partitions)?;

    if keys.is_empty() {
        debug!("empty input for {} partitions, nothing to build", partitions);
        return Ok((S::empty(), BuildStats::default()));
    }

    let (parts, build_busy) = build_phase::<K, S>(&slices)?;
    debug!(
        "built {} partitions of {} keys in {:?} of worker time, merging",
        parts.len(),
        keys.len(),
        build_busy
    );

    let (set, merge_levels, merge_busy) = merge_phase::<K, S>(parts)?;
    debug!(
        "merged into {} keys in {} levels, {:?} of union time",
        set.len(),
        merge_levels,
        merge_busy
    );

    Ok((
        set,
        BuildStats {
            workers: slices.len(),
            merge_levels,
            busy: build_busy + merge_busy,
        },
    ))
}

/// run one worker per slice and wait for all of them, returning the summed worker time
fn build_phase<K, S>(slices: &[&[K]]) -> Result<(Vec<S>, Duration), BuildError>
where
    K: Ord + Clone + Sync,
    S: PersistentSet<K> + Send,
{
    let joined = thread::scope(|s| {
        let handles = slices
            .iter()
            .map(|slice| {
                s.spawn(move |_| {
                    let start = Instant::now();
                    let set = build_partition::<K, S>(slice);
                    (set, start.elapsed())
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .enumerate()
            .map(|(partition, h)| {
                h.join()
                    .map_err(|_| BuildError::WorkerFailure { partition })
            })
            .collect::<Vec<_>>()
    })
    // every handle is joined above, so the scope itself cannot report a panic
    .map_err(|_| BuildError::WorkerFailure { partition: 0 })?;

    let mut sets = Vec::with_capacity(joined.len());
    let mut busy = Duration::ZERO;

    for result in joined {
        let (set, elapsed) = result?;
        sets.push(set);
        busy += elapsed;
    }

    Ok((sets, busy))
}

enum Pending<'scope, S> {
    Merging(ScopedJoinHandle<'scope, (S, Duration)>),
    Carried(S),
}

/// reduce the partial sets pairwise, returning the result, the number of levels and
/// the summed union time
fn merge_phase<K, S>(mut level: Vec<S>) -> Result<(S, usize, Duration), BuildError>
where
    K: Ord + Clone,
    S: PersistentSet<K> + Send,
{
    let mut depth = 0;
    let mut busy = Duration::ZERO;

    while level.len() > 1 {
        depth += 1;

        let merged = thread::scope(|s| {
            let mut pending = Vec::with_capacity((level.len() + 1) / 2);
            let mut sets = level.drain(..);

            while let Some(left) = sets.next() {
                match sets.next() {
                    Some(right) => {
                        pending.push(Pending::Merging(s.spawn(move |_| {
                            let start = Instant::now();
                            let set = left.union(&right);
                            (set, start.elapsed())
                        })))
                    }
                    None => pending.push(Pending::Carried(left)),
                }
            }

            pending
                .into_iter()
                .map(|p| match p {
                    Pending::Merging(h) => {
                        h.join().map_err(|_| BuildError::MergeFailure { level: depth })
                    }
                    Pending::Carried(set) => Ok((set, Duration::ZERO)),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(|_| BuildError::MergeFailure { level: depth })??;

        level = Vec::with_capacity(merged.len());
        for (set, elapsed) in merged {
            level.push(set);
            busy += elapsed;
        }
    }

    match level.pop() {
        Some(set) => Ok((set, depth, busy)),
        None => Ok((S::empty(), depth, busy)),
    }
}
