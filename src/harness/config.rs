use super::{sweep, Sweep};

/// Parameters of a scaling sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Size of the smallest bucket. Bucket `i` (1-based) times prefixes of `i * base_chunk` keys.
    pub base_chunk: usize,
    pub buckets: usize,
    pub partition_counts: Vec<usize>,
    pub repetitions: usize,
}

const DEFAULT_BUCKETS: usize = 10;
const DEFAULT_BASE_CHUNK: usize = 10_000;
const DEFAULT_REPETITIONS: usize = 3;

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            base_chunk: DEFAULT_BASE_CHUNK,
            buckets: DEFAULT_BUCKETS,
            partition_counts: (1..=num_cpus::get()).collect(),
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

impl SweepConfig {
    /// Default config whose largest bucket covers (almost) all `len` keys.
    pub fn for_input(len: usize) -> Self {
        let config = Self::default();
        let base_chunk = (len / config.buckets).max(1);

        config.base_chunk(base_chunk)
    }

    pub fn base_chunk(mut self, base_chunk: usize) -> Self {
        self.base_chunk = base_chunk;
        self
    }

    pub fn buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn partition_counts(mut self, partition_counts: Vec<usize>) -> Self {
        self.partition_counts = partition_counts;
        self
    }

    /// Partition counts `1..=max`.
    pub fn max_partitions(self, max: usize) -> Self {
        self.partition_counts((1..=max).collect())
    }

    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn sizes(&self) -> Vec<usize> {
        (1..=self.buckets).map(|i| i * self.base_chunk).collect()
    }

    pub fn run<'a, K>(&self, keys: &'a [K]) -> Sweep<'a, K> {
        sweep(keys, &self.sizes(), &self.partition_counts, self.repetitions)
    }
}
