//! XGBoost-style gradient boosting with second-order approximation
//!
//! - Squared error loss: gradient = prediction - target, hessian = 1
//! - Regularized leaf weights: w* = -T_alpha(G) / (H + lambda)
//! - Gain-based split scoring:
//!   Gain = 0.5 * [T(GL)²/(HL+λ) + T(GR)²/(HR+λ) - T(G)²/(H+λ)] - γ
//!   where T is soft thresholding by the L1 strength alpha
//! - Minimum child weight constraint

use crate::error::{PredictorError, Result};
use super::models::r2_score;
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// XGBoost configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XGBoostConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// L1 regularization on leaf weights
    pub reg_alpha: f64,
    /// Minimum loss reduction to make a split (gamma)
    pub gamma: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub random_state: Option<u64>,
}

impl Default for XGBoostConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: Some(42),
        }
    }
}

impl XGBoostConfig {
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_reg_alpha(mut self, alpha: f64) -> Self {
        self.reg_alpha = alpha;
        self
    }

    fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: f64, reason: &str| PredictorError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if !(self.learning_rate > 0.0) {
            return Err(invalid("learning_rate", self.learning_rate, "must be positive"));
        }
        if self.reg_alpha < 0.0 || self.reg_lambda < 0.0 {
            return Err(invalid("reg_alpha/reg_lambda", self.reg_alpha.min(self.reg_lambda), "must be non-negative"));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(invalid("subsample", self.subsample, "must be in (0, 1]"));
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err(invalid("colsample_bytree", self.colsample_bytree, "must be in (0, 1]"));
        }
        Ok(())
    }
}

/// A single node in the XGBoost tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum XGBNode {
    Leaf { weight: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<XGBNode>,
        right: Box<XGBNode>,
    },
}

impl XGBNode {
    fn predict(&self, sample: &ArrayView1<f64>) -> f64 {
        match self {
            XGBNode::Leaf { weight } => *weight,
            XGBNode::Split { feature, threshold, left, right } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }
}

/// Gradient statistics shared by every node of one tree
struct TreeContext<'a> {
    x: &'a Array2<f64>,
    grad: &'a Array1<f64>,
    hess: &'a Array1<f64>,
    feature_indices: &'a [usize],
    config: &'a XGBoostConfig,
}

/// Build an XGBoost tree using exact greedy split finding
fn build_xgb_tree(ctx: &TreeContext<'_>, indices: &[usize], depth: usize) -> XGBNode {
    let config = ctx.config;
    let n = indices.len();

    let g_sum: f64 = indices.iter().map(|&i| ctx.grad[i]).sum();
    let h_sum: f64 = indices.iter().map(|&i| ctx.hess[i]).sum();

    let leaf_weight = compute_leaf_weight(g_sum, h_sum, config.reg_lambda, config.reg_alpha);

    // Stopping conditions
    if depth >= config.max_depth || n < 2 || h_sum < config.min_child_weight {
        return XGBNode::Leaf { weight: leaf_weight };
    }

    // Find best split across features (parallelized)
    let best_split = ctx.feature_indices.par_iter().filter_map(|&f| {
        find_best_split_for_feature(ctx, indices, f)
    }).max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

    match best_split {
        Some((feature, threshold, gain)) if gain > config.gamma => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
                indices.iter().copied().partition(|&i| ctx.x[[i, feature]] <= threshold);

            if left_idx.is_empty() || right_idx.is_empty() {
                return XGBNode::Leaf { weight: leaf_weight };
            }

            let left = build_xgb_tree(ctx, &left_idx, depth + 1);
            let right = build_xgb_tree(ctx, &right_idx, depth + 1);

            XGBNode::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => XGBNode::Leaf { weight: leaf_weight },
    }
}

/// Soft threshold of the gradient sum by the L1 strength
fn threshold_l1(g: f64, alpha: f64) -> f64 {
    if g > alpha {
        g - alpha
    } else if g < -alpha {
        g + alpha
    } else {
        0.0
    }
}

/// Optimal leaf weight with L1 (alpha) and L2 (lambda) regularization
fn compute_leaf_weight(g_sum: f64, h_sum: f64, lambda: f64, alpha: f64) -> f64 {
    let denom = h_sum + lambda;
    if denom <= 0.0 {
        return 0.0;
    }
    -threshold_l1(g_sum, alpha) / denom
}

/// Structure score of a node: T(G)² / (H + λ)
fn node_score(g: f64, h: f64, lambda: f64, alpha: f64) -> f64 {
    let denom = h + lambda;
    if denom <= 0.0 {
        return 0.0;
    }
    let t = threshold_l1(g, alpha);
    t * t / denom
}

/// Find best split for a single feature using exact greedy method.
/// Returns `(feature, threshold, gain)`.
fn find_best_split_for_feature(
    ctx: &TreeContext<'_>,
    indices: &[usize],
    feature: usize,
) -> Option<(usize, f64, f64)> {
    let x = ctx.x;
    let config = ctx.config;

    let mut sorted_indices: Vec<usize> = indices.to_vec();
    sorted_indices.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

    let g_total: f64 = sorted_indices.iter().map(|&i| ctx.grad[i]).sum();
    let h_total: f64 = sorted_indices.iter().map(|&i| ctx.hess[i]).sum();
    let parent_score = node_score(g_total, h_total, config.reg_lambda, config.reg_alpha);

    let mut g_left = 0.0;
    let mut h_left = 0.0;
    let mut best_gain = f64::NEG_INFINITY;
    let mut best_threshold = 0.0;

    // The last position cannot split anything off
    for pos in 0..sorted_indices.len() - 1 {
        let idx = sorted_indices[pos];
        let next_idx = sorted_indices[pos + 1];
        g_left += ctx.grad[idx];
        h_left += ctx.hess[idx];

        // Skip if next sample has same feature value (avoid identical split)
        if (x[[idx, feature]] - x[[next_idx, feature]]).abs() < 1e-12 {
            continue;
        }

        let g_right = g_total - g_left;
        let h_right = h_total - h_left;

        if h_left < config.min_child_weight || h_right < config.min_child_weight {
            continue;
        }

        let gain = 0.5 * (
            node_score(g_left, h_left, config.reg_lambda, config.reg_alpha)
            + node_score(g_right, h_right, config.reg_lambda, config.reg_alpha)
            - parent_score
        );

        if gain > best_gain {
            best_gain = gain;
            best_threshold = (x[[idx, feature]] + x[[next_idx, feature]]) / 2.0;
        }
    }

    if best_gain > f64::NEG_INFINITY {
        Some((feature, best_threshold, best_gain))
    } else {
        None
    }
}

// ─── XGBoost Regressor ─────────────────────────────────────────────────────

/// XGBoost Regressor (squared error loss)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XGBoostRegressor {
    config: XGBoostConfig,
    trees: Vec<XGBNode>,
    base_score: f64,
    n_features: usize,
}

impl XGBoostRegressor {
    pub fn new(config: XGBoostConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: 0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.config.validate()?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 {
            return Err(PredictorError::TrainingError("cannot fit on an empty matrix".to_string()));
        }
        if y.len() != n_samples {
            return Err(PredictorError::ShapeError {
                expected: format!("{} targets", n_samples),
                actual: format!("{} targets", y.len()),
            });
        }
        self.n_features = n_features;

        // Base prediction = mean(y)
        self.base_score = y.mean().unwrap_or(0.0);
        let mut preds = Array1::from_elem(n_samples, self.base_score);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.trees.clear();
        let hess = Array1::from_elem(n_samples, 1.0);

        for _ in 0..self.config.n_estimators {
            let grad: Array1<f64> = &preds - y;

            let row_indices = subsample(&mut rng, n_samples, self.config.subsample);
            let col_indices = subsample(&mut rng, n_features, self.config.colsample_bytree);

            let ctx = TreeContext {
                x,
                grad: &grad,
                hess: &hess,
                feature_indices: &col_indices,
                config: &self.config,
            };
            let tree = build_xgb_tree(&ctx, &row_indices, 0);

            for (i, row) in x.rows().into_iter().enumerate() {
                preds[i] += self.config.learning_rate * tree.predict(&row);
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.n_features == 0 {
            return Err(PredictorError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let preds = x
            .rows()
            .into_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .fold(self.base_score, |acc, tree| acc + self.config.learning_rate * tree.predict(&row))
            })
            .collect();
        Ok(preds)
    }

    /// Coefficient of determination on `(x, y)`
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let p = self.predict(x)?;
        Ok(r2_score(y, &p))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn subsample(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let k = ((n as f64) * ratio).ceil() as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k.max(1));
    indices.sort();
    indices
}
