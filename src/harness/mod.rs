mod config;

pub use config::SweepConfig;

use crate::{
    avltree::AVLTree,
    builder::{build_parallel_with_stats, BuildError},
};
use log::{debug, info, warn};
use std::{
    hint::black_box,
    time::{Duration, Instant},
};
use thiserror::Error;

/// Timing of one (size, partitions) cell of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub size: usize,
    pub partitions: usize,
    /// CPU time of each repetition, in run order: the time every build and union
    /// task spent on its own thread plus the final traversal
    pub run_times_seconds: Vec<f64>,
    /// arithmetic mean of `run_times_seconds`
    pub mean_time_seconds: f64,
    /// `mean_time_seconds / partitions`, the "mean divided by P" figure reported
    /// for scaling curves
    pub per_core_time_seconds: f64,
}

impl Measurement {
    fn from_runs(size: usize, partitions: usize, runs: &[Duration]) -> Self {
        let run_times_seconds: Vec<f64> = runs.iter().map(Duration::as_secs_f64).collect();
        let mean_time_seconds =
            run_times_seconds.iter().sum::<f64>() / run_times_seconds.len() as f64;

        Measurement {
            size,
            partitions,
            run_times_seconds,
            mean_time_seconds,
            per_core_time_seconds: mean_time_seconds / partitions as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("a trial needs at least one repetition")]
    NoRepetitions,
}

/// A trial that produced no measurement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("trial (size: {size}, partitions: {partitions}) failed: {source}")]
pub struct TrialError {
    pub size: usize,
    pub partitions: usize,
    pub source: HarnessError,
}

/// Time `repetitions` runs of `build_parallel(keys, partitions)`.
///
/// A run's time is the sum of the time each build and union task measured on its own
/// thread, plus the full traversal of the built tree that closes the run. Waiting at
/// the join barrier is not counted. The tree is dropped after the clock stops.
pub fn run_trial<K>(
    keys: &[K],
    partitions: usize,
    repetitions: usize,
) -> Result<Measurement, TrialError>
where
    K: Ord + Clone + Send + Sync,
{
    let fail = |source: HarnessError| TrialError {
        size: keys.len(),
        partitions,
        source,
    };

    if repetitions == 0 {
        return Err(fail(HarnessError::NoRepetitions));
    }

    let mut runs = Vec::with_capacity(repetitions);

    for rep in 0..repetitions {
        let wall = Instant::now();
        let (tree, stats): (AVLTree<K>, _) = build_parallel_with_stats(keys, partitions)
            .map_err(|e| fail(HarnessError::Build(e)))?;

        let start = Instant::now();
        let visited = black_box(tree.force());
        let cpu = stats.busy + start.elapsed();

        debug!(
            "size {} partitions {} run {}: {} keys, {:?} cpu, {:?} wall",
            keys.len(),
            partitions,
            rep,
            visited,
            cpu,
            wall.elapsed()
        );

        drop(tree);
        runs.push(cpu);
    }

    let measurement = Measurement::from_runs(keys.len(), partitions, &runs);
    info!(
        "size {} partitions {}: mean {:.6}s, per core {:.6}s",
        measurement.size,
        measurement.partitions,
        measurement.mean_time_seconds,
        measurement.per_core_time_seconds
    );

    Ok(measurement)
}

/// Lazy sweep over every (size, partitions) pair, sizes in the outer loop.
///
/// Each item is one trial. A failed trial is yielded as an error and the sweep moves
/// on to the next pair. A clone replays the remaining trials from the same position.
#[derive(Debug)]
pub struct Sweep<'a, K> {
    keys: &'a [K],
    sizes: Vec<usize>,
    partition_counts: Vec<usize>,
    repetitions: usize,
    next: usize,
}

impl<'a, K> Clone for Sweep<'a, K> {
    fn clone(&self) -> Self {
        Sweep {
            keys: self.keys,
            sizes: self.sizes.clone(),
            partition_counts: self.partition_counts.clone(),
            repetitions: self.repetitions,
            next: self.next,
        }
    }
}

/// Sweep `keys` prefixes of each length in `sizes` across `partition_counts`.
pub fn sweep<'a, K>(
    keys: &'a [K],
    sizes: &[usize],
    partition_counts: &[usize],
    repetitions: usize,
) -> Sweep<'a, K> {
    Sweep {
        keys,
        sizes: sizes.to_vec(),
        partition_counts: partition_counts.to_vec(),
        repetitions,
        next: 0,
    }
}

impl<'a, K> Sweep<'a, K> {
    fn total(&self) -> usize {
        self.sizes.len() * self.partition_counts.len()
    }
}

impl<'a, K> Iterator for Sweep<'a, K>
where
    K: Ord + Clone + Send + Sync,
{
    type Item = Result<Measurement, TrialError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }

        let size = self.sizes[self.next / self.partition_counts.len()];
        let partitions = self.partition_counts[self.next % self.partition_counts.len()];
        self.next += 1;

        if size > self.keys.len() {
            warn!(
                "requested size {} exceeds the {} available keys, clamping",
                size,
                self.keys.len()
            );
        }
        let prefix = &self.keys[..size.min(self.keys.len())];

        let result = run_trial(prefix, partitions, self.repetitions);
        if let Err(e) = &result {
            warn!("{}", e);
        }

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a, K> ExactSizeIterator for Sweep<'a, K> where K: Ord + Clone + Send + Sync {}
