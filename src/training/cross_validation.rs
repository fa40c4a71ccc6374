//! K-fold cross-validation

use crate::error::{PredictorError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single train/test split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter. Without shuffling, folds are contiguous blocks in row order.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    /// Generate train/test splits. The first `n_samples % n_splits` folds get
    /// one extra sample.
    pub fn split(&self, n_samples: usize) -> Result<Vec<CVSplit>> {
        let n_splits = self.n_splits;
        if n_splits < 2 {
            return Err(PredictorError::ValidationError(
                "n_splits must be at least 2".to_string()
            ));
        }
        if n_samples < n_splits {
            return Err(PredictorError::ValidationError(
                format!("n_samples ({}) must be >= n_splits ({})", n_samples, n_splits)
            ));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();

        if self.shuffle {
            let mut rng = match self.random_state {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;

        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;

        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(CVSplit {
                train_indices,
                test_indices,
                fold_idx,
            });

            current += fold_size;
        }

        Ok(splits)
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds, NaN if any fold is NaN
    pub mean_score: f64,
    /// Population standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        if n_folds == 0 {
            return Self {
                scores,
                mean_score: f64::NAN,
                std_score: f64::NAN,
                n_folds,
            };
        }
        let mean_score = scores.iter().sum::<f64>() / n_folds as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds as f64;
        let std_score = variance.sqrt();

        Self {
            scores,
            mean_score,
            std_score,
            n_folds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold() {
        let splits = KFold::new(5).split(100).unwrap();

        assert_eq!(splits.len(), 5);

        // Each test set should have 20 samples
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }

        // All indices should be covered exactly once in test sets
        let mut all_test: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        all_test.sort();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_k_fold_contiguous_without_shuffle() {
        let splits = KFold::new(3).split(7).unwrap();
        assert_eq!(splits[0].test_indices, vec![0, 1, 2]);
        assert_eq!(splits[1].test_indices, vec![3, 4]);
        assert_eq!(splits[2].test_indices, vec![5, 6]);
        assert_eq!(splits[1].train_indices, vec![0, 1, 2, 5, 6]);
    }

    #[test]
    fn test_k_fold_shuffle_reproducible() {
        let a = KFold::new(4).with_shuffle(true).with_random_state(Some(7)).split(20).unwrap();
        let b = KFold::new(4).with_shuffle(true).with_random_state(Some(7)).split(20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_fold_too_few_samples() {
        assert!(KFold::new(10).split(3).is_err());
        assert!(KFold::new(1).split(3).is_err());
    }

    #[test]
    fn test_cv_results() {
        let results = CVResults::from_scores(vec![0.8, 0.85, 0.9, 0.82, 0.88]);
        assert!((results.mean_score - 0.85).abs() < 0.01);
        assert!(results.std_score > 0.0);
        assert_eq!(results.n_folds, 5);
    }

    #[test]
    fn test_cv_results_nan_propagates() {
        let results = CVResults::from_scores(vec![0.5, f64::NAN]);
        assert!(results.mean_score.is_nan());
    }
}
