//! Exhaustive cross-validated grid search over pipeline hyperparameters
//!
//! Every (candidate, fold) pair is an independent job. Jobs fan out over a
//! fixed-size worker pool, each fitting a private pipeline, and the scores
//! are collected per candidate afterwards. The best candidate is then refit
//! once on the full training set.

use crate::error::{PredictorError, Result};
use crate::preprocessing::RawMatrix;
use crate::training::{CVResults, CVSplit, KFold, ModelPipeline};
use crate::utils::{parallel_map_with_config, run_sequential};
use super::{
    config::SearchConfig,
    search_space::{CandidateParams, ParamGrid},
};
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of one grid point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    /// Position in grid order
    pub trial_id: usize,
    /// Parameters used
    pub params: CandidateParams,
    /// Held-out R² per fold, NaN where the job failed
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
    /// 1 = best; candidates with equal mean share a rank, NaN ranks last
    pub rank: usize,
}

/// Outcome of a complete search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// All trial results, in grid order
    pub trials: Vec<TrialResult>,
    /// Best trial index
    pub best_trial_idx: usize,
    /// Folds used per candidate
    pub n_folds: usize,
    /// Total duration
    pub total_duration_secs: f64,
}

impl SearchResult {
    /// Get the best trial
    pub fn best_trial(&self) -> &TrialResult {
        &self.trials[self.best_trial_idx]
    }

    /// Get the best parameters
    pub fn best_params(&self) -> &CandidateParams {
        &self.best_trial().params
    }

    /// Get the best mean score
    pub fn best_score(&self) -> f64 {
        self.best_trial().mean_score
    }
}

/// Grid search with k-fold cross-validation and a final refit
#[derive(Debug, Clone)]
pub struct GridSearchCV {
    estimator: ModelPipeline,
    grid: ParamGrid,
    config: SearchConfig,
    result: Option<SearchResult>,
    best_estimator: Option<ModelPipeline>,
}

impl GridSearchCV {
    pub fn new(estimator: ModelPipeline, grid: ParamGrid, config: SearchConfig) -> Self {
        Self {
            estimator,
            grid,
            config,
            result: None,
            best_estimator: None,
        }
    }

    /// Evaluate every grid point, then refit the best one on all of `x`
    pub fn fit(&mut self, x: &RawMatrix, y: &Array1<f64>) -> Result<&SearchResult> {
        let start = Instant::now();
        self.result = None;
        self.best_estimator = None;

        if x.nrows() != y.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{} targets", y.len()),
            });
        }
        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(PredictorError::OptimizationError("parameter grid is empty".to_string()));
        }

        let n_folds = self.effective_folds(x.nrows())?;
        let splits = KFold::new(n_folds)
            .with_shuffle(self.config.shuffle)
            .with_random_state(self.config.random_state)
            .split(x.nrows())?;

        info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            n_folds,
            candidates.len(),
            n_folds * candidates.len()
        );

        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..n_folds).map(move |f| (c, f)))
            .collect();

        let scores = parallel_map_with_config(tasks, &self.config.parallel(), |(c, f)| {
            let score = self.evaluate(&candidates[c], &splits[f], x, y);
            (c, f, score)
        })?;

        let mut fold_scores = vec![vec![f64::NAN; n_folds]; candidates.len()];
        for (c, f, score) in scores {
            fold_scores[c][f] = score;
        }

        let mut trials: Vec<TrialResult> = candidates
            .into_iter()
            .zip(fold_scores)
            .enumerate()
            .map(|(trial_id, (params, scores))| {
                let cv = CVResults::from_scores(scores);
                debug!(trial = trial_id, mean = cv.mean_score, ?params, "Candidate scored");
                TrialResult {
                    trial_id,
                    params,
                    fold_scores: cv.scores,
                    mean_score: cv.mean_score,
                    std_score: cv.std_score,
                    rank: 0,
                }
            })
            .collect();

        assign_ranks(&mut trials);
        let best_trial_idx = trials.iter().position(|t| t.rank == 1).unwrap_or(0);
        let best = &trials[best_trial_idx];
        info!(trial = best_trial_idx, score = best.mean_score, params = ?best.params, "Best candidate");

        let mut best_estimator = self
            .estimator
            .with_params(best.params.apply(self.estimator.params()));
        // Refit runs on a single thread once every fold job has finished
        run_sequential(|| best_estimator.fit(x, y).map(|_| ()))??;
        info!(rows = x.nrows(), "Refit best candidate on the full training set");

        self.best_estimator = Some(best_estimator);
        let result = self.result.insert(SearchResult {
            trials,
            best_trial_idx,
            n_folds,
            total_duration_secs: start.elapsed().as_secs_f64(),
        });
        Ok(&*result)
    }

    /// Predict with the refit best pipeline
    pub fn predict(&self, x: &RawMatrix) -> Result<Array1<f64>> {
        self.best_estimator
            .as_ref()
            .ok_or(PredictorError::ModelNotFitted)?
            .predict(x)
    }

    pub fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref()
    }

    pub fn best_estimator(&self) -> Option<&ModelPipeline> {
        self.best_estimator.as_ref()
    }

    /// Consume the search, returning the refit best pipeline
    pub fn into_best_estimator(self) -> Result<ModelPipeline> {
        self.best_estimator.ok_or(PredictorError::ModelNotFitted)
    }

    /// Fold count actually used: one fold per row when there are fewer rows
    /// than configured folds
    fn effective_folds(&self, n_rows: usize) -> Result<usize> {
        if n_rows < 2 {
            return Err(PredictorError::ValidationError(format!(
                "cross-validation needs at least 2 training rows, got {}",
                n_rows
            )));
        }
        if self.config.cv_folds < 2 {
            return Err(PredictorError::InvalidParameter {
                name: "cv_folds".to_string(),
                value: self.config.cv_folds.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if n_rows < self.config.cv_folds {
            warn!(
                rows = n_rows,
                requested = self.config.cv_folds,
                "Fewer training rows than folds, using one fold per row"
            );
            return Ok(n_rows);
        }
        Ok(self.config.cv_folds)
    }

    /// Fit a private pipeline on the training folds and score the held-out
    /// fold. A failed job scores NaN.
    fn evaluate(&self, params: &CandidateParams, split: &CVSplit, x: &RawMatrix, y: &Array1<f64>) -> f64 {
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train = y.select(Axis(0), &split.train_indices);
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test = y.select(Axis(0), &split.test_indices);

        let mut pipeline = self.estimator.with_params(params.apply(self.estimator.params()));
        let outcome = pipeline
            .fit(&x_train, &y_train)
            .and_then(|fitted| fitted.score(&x_test, &y_test));

        match outcome {
            Ok(score) => score,
            Err(e) => {
                warn!(fold = split.fold_idx, error = %e, "Fold job failed, scoring NaN");
                f64::NAN
            }
        }
    }
}

/// Rank by mean score, highest first. NaN means rank after every finite mean.
fn assign_ranks(trials: &mut [TrialResult]) {
    let means: Vec<f64> = trials.iter().map(|t| t.mean_score).collect();
    let n_scored = means.iter().filter(|m| !m.is_nan()).count();
    for (trial, &mean) in trials.iter_mut().zip(&means) {
        trial.rank = if mean.is_nan() {
            n_scored + 1
        } else {
            1 + means.iter().filter(|&&other| other > mean).count()
        };
    }
}
