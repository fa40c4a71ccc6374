//! Model pipeline: column transformer chained with the boosted regressor
//!
//! Transform state and model state are produced by the same `fit` call and
//! stored together, so a prediction can never mix state from two fits.

use crate::error::{PredictorError, Result};
use crate::preprocessing::{ColumnTransformer, PreprocessingConfig, RawMatrix};
use super::models::r2_score;
use super::xgboost::{XGBoostConfig, XGBoostRegressor};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fit state of a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineState {
    Unfitted,
    Fitted {
        transformer: ColumnTransformer,
        model: XGBoostRegressor,
    },
}

/// Single fit/predict unit over raw feature matrices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPipeline {
    n_numeric: usize,
    n_categorical: usize,
    preprocessing: PreprocessingConfig,
    params: XGBoostConfig,
    state: PipelineState,
}

impl ModelPipeline {
    pub fn new(n_numeric: usize, n_categorical: usize) -> Self {
        Self {
            n_numeric,
            n_categorical,
            preprocessing: PreprocessingConfig::default(),
            params: XGBoostConfig::default(),
            state: PipelineState::Unfitted,
        }
    }

    pub fn with_preprocessing(mut self, config: PreprocessingConfig) -> Self {
        self.preprocessing = config;
        self.state = PipelineState::Unfitted;
        self
    }

    /// Unfitted copy of this pipeline with different regressor hyperparameters
    pub fn with_params(&self, params: XGBoostConfig) -> Self {
        Self {
            n_numeric: self.n_numeric,
            n_categorical: self.n_categorical,
            preprocessing: self.preprocessing.clone(),
            params,
            state: PipelineState::Unfitted,
        }
    }

    /// Replace the regressor hyperparameters; any fitted state is dropped
    pub fn set_params(&mut self, params: XGBoostConfig) {
        self.params = params;
        self.state = PipelineState::Unfitted;
    }

    pub fn params(&self) -> &XGBoostConfig {
        &self.params
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, PipelineState::Fitted { .. })
    }

    /// Fit the transformer on `x`, then the regressor on the transformed matrix
    pub fn fit(&mut self, x: &RawMatrix, y: &Array1<f64>) -> Result<&mut Self> {
        self.state = PipelineState::Unfitted;
        if x.nrows() != y.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{} targets", y.len()),
            });
        }

        let mut transformer =
            ColumnTransformer::with_config(self.n_numeric, self.n_categorical, self.preprocessing.clone());
        let features = transformer.fit_transform(x)?;

        let mut model = XGBoostRegressor::new(self.params.clone());
        model.fit(&features, y)?;

        debug!(
            rows = x.nrows(),
            features = features.ncols(),
            trees = model.n_trees(),
            "Fitted pipeline"
        );

        self.state = PipelineState::Fitted { transformer, model };
        Ok(self)
    }

    /// Transform `x` with the fitted transformer and run inference
    pub fn predict(&self, x: &RawMatrix) -> Result<Array1<f64>> {
        match &self.state {
            PipelineState::Unfitted => Err(PredictorError::ModelNotFitted),
            PipelineState::Fitted { transformer, model } => {
                let features = transformer.transform(x)?;
                model.predict(&features)
            }
        }
    }

    /// R² of the predictions on `(x, y)`
    pub fn score(&self, x: &RawMatrix, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        Ok(r2_score(y, &predictions))
    }
}
