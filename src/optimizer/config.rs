//! Search configuration

use crate::utils::ParallelConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the cross-validated grid search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Cross-validation folds for evaluation
    pub cv_folds: usize,

    /// Number of parallel workers (None = all cores)
    pub n_jobs: Option<usize>,

    /// Shuffle rows before splitting into folds
    pub shuffle: bool,

    /// Random seed for shuffling
    pub random_state: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cv_folds: 10,
            n_jobs: None,
            shuffle: false,
            random_state: Some(42),
        }
    }
}

impl SearchConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the fold count
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Builder method to bound the worker pool
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = Some(n);
        self
    }

    /// Builder method to shuffle rows before splitting
    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.random_state = seed;
        self
    }

    /// Worker pool settings for the fold jobs
    pub fn parallel(&self) -> ParallelConfig {
        ParallelConfig {
            n_threads: self.n_jobs,
        }
    }
}
