//! Worker pool configuration and parallel map helpers

use crate::error::{PredictorError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Number of threads (None = use all available)
    pub n_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of threads
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self
    }

    /// Get the number of threads to use
    pub fn num_threads(&self) -> usize {
        self.n_threads
            .filter(|&n| n > 0)
            .unwrap_or_else(rayon::current_num_threads)
    }

    /// Build a dedicated fixed-size pool
    pub fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads())
            .build()
            .map_err(|e| PredictorError::ThreadPoolError(format!("Thread pool error: {}", e)))
    }
}

/// Parallel map on a pool sized by `config`; output order matches input order
pub fn parallel_map_with_config<T, U, F>(items: Vec<T>, config: &ParallelConfig, f: F) -> Result<Vec<U>>
where
    T: Send + Sync,
    U: Send,
    F: Fn(T) -> U + Send + Sync,
{
    let pool = config.build_pool()?;
    Ok(pool.install(|| items.into_par_iter().map(f).collect()))
}

/// Run `f` on a one-thread pool, so rayon work nested inside it runs
/// sequentially
pub fn run_sequential<R, F>(f: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let pool = ParallelConfig::new().with_threads(1).build_pool()?;
    Ok(pool.install(f))
}
