//! Discrete hyperparameter grid

use crate::training::XGBoostConfig;
use serde::{Deserialize, Serialize};

/// One point of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateParams {
    pub learning_rate: f64,
    pub max_depth: usize,
    pub n_estimators: usize,
    pub reg_alpha: f64,
}

impl CandidateParams {
    /// Overlay this point on a base regressor configuration
    pub fn apply(&self, base: &XGBoostConfig) -> XGBoostConfig {
        XGBoostConfig {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            learning_rate: self.learning_rate,
            reg_alpha: self.reg_alpha,
            ..base.clone()
        }
    }
}

/// Value lists whose Cartesian product is searched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<usize>,
    pub learning_rate: Vec<f64>,
    pub reg_alpha: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![50, 100, 200, 300],
            max_depth: vec![10, 20, 30, 40, 50],
            learning_rate: vec![1.0, 0.1, 0.01],
            reg_alpha: vec![1.0, 0.1, 0.01],
        }
    }
}

impl ParamGrid {
    /// Grid with a single value per parameter
    pub fn single(params: &XGBoostConfig) -> Self {
        Self {
            n_estimators: vec![params.n_estimators],
            max_depth: vec![params.max_depth],
            learning_rate: vec![params.learning_rate],
            reg_alpha: vec![params.reg_alpha],
        }
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.n_estimators.len() * self.max_depth.len() * self.learning_rate.len() * self.reg_alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every grid point. Parameter names are iterated in alphabetical order
    /// with the last one varying fastest.
    pub fn candidates(&self) -> Vec<CandidateParams> {
        let mut out = Vec::with_capacity(self.len());
        for &learning_rate in &self.learning_rate {
            for &max_depth in &self.max_depth {
                for &n_estimators in &self.n_estimators {
                    for &reg_alpha in &self.reg_alpha {
                        out.push(CandidateParams {
                            learning_rate,
                            max_depth,
                            n_estimators,
                            reg_alpha,
                        });
                    }
                }
            }
        }
        out
    }
}
