//! Rayon fan-out helpers for Monte Carlo runs and sensitivity sweeps.
//!
//! Every grid point and every sample is an independent allocation, so
//! the only tuning that matters is when the rayon overhead is worth
//! paying and how work is chunked for cache locality.

use rayon::prelude::*;

/// Batch size for chunked parallel processing.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Minimum item count before fanning out.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100;

/// Parallel execution configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Items per chunk.
    pub batch_size: usize,
    /// Minimum items before using parallelism.
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Creates a configuration; a zero batch size is bumped to one.
    pub fn new(batch_size: usize, parallel_threshold: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            parallel_threshold,
        }
    }

    /// Whether `n_items` is worth fanning out.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }
}

/// Maps items in parallel, preserving order.
pub fn parallel_map<T, R, F>(items: &[T], mapper: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.par_iter().map(mapper).collect()
}

/// Maps items either in parallel or serially per the configuration,
/// preserving order.
///
/// Parallel runs chunk the input by `batch_size` so each rayon task
/// walks a contiguous slice.
pub fn adaptive_map<T, R, F>(config: &ParallelConfig, items: &[T], mapper: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if config.should_parallelize(items.len()) {
        items
            .par_chunks(config.batch_size.max(1))
            .flat_map_iter(|chunk| chunk.iter().map(&mapper))
            .collect()
    } else {
        items.iter().map(mapper).collect()
    }
}
