//! Regression metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for model evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean Squared Error
    pub mse: Option<f64>,
    /// Root Mean Squared Error
    pub rmse: Option<f64>,
    /// Mean Absolute Error
    pub mae: Option<f64>,
    /// R-squared
    pub r2: Option<f64>,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute regression metrics
    pub fn compute_regression(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut metrics = Self::new();
        metrics.n_samples = y_true.len();
        if y_true.is_empty() {
            return metrics;
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        // MSE
        let mse: f64 = errors.iter().map(|e| e * e).sum::<f64>() / n;
        metrics.mse = Some(mse);
        metrics.rmse = Some(mse.sqrt());

        // MAE
        let mae: f64 = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        metrics.mae = Some(mae);

        metrics.r2 = Some(r2_score(y_true, y_pred));

        metrics
    }
}

/// Coefficient of determination.
///
/// Fewer than two samples give NaN. A constant target gives 1.0 when every
/// prediction is exact and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len();
    if n < 2 || y_pred.len() != n {
        return f64::NAN;
    }

    let y_mean = y_true.sum() / n as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = ModelMetrics::compute_regression(&y_true, &y_pred);

        assert!(metrics.mse.is_some());
        assert!(metrics.rmse.is_some());
        assert!(metrics.r2.unwrap() > 0.9);
        assert!((metrics.mae.unwrap() - 0.06).abs() < 1e-9);
    }

    #[test]
    fn test_r2_perfect_and_mean() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert!((r2_score(&y, &array![2.0, 2.0, 2.0])).abs() < 1e-12);
    }

    #[test]
    fn test_r2_single_sample_is_nan() {
        assert!(r2_score(&array![1.0], &array![1.0]).is_nan());
    }

    #[test]
    fn test_r2_constant_target() {
        let y = array![5.0, 5.0];
        assert_eq!(r2_score(&y, &array![5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&y, &array![4.0, 5.0]), 0.0);
    }
}
