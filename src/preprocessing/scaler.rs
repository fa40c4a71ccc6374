//! Feature scaling implementations

use crate::error::{PredictorError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

/// Parameters for a fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64,    // mean or min
    scale: f64,     // std or range
}

/// Feature scaler over a dense numeric matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    data_min: Vec<f64>,
    data_max: Vec<f64>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            data_min: Vec::new(),
            data_max: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, x: &ArrayView2<f64>) -> Result<&mut Self> {
        let n_cols = x.ncols();
        self.params = Vec::with_capacity(n_cols);
        self.data_min = Vec::with_capacity(n_cols);
        self.data_max = Vec::with_capacity(n_cols);

        for column in x.axis_iter(Axis(1)) {
            let values = column.to_vec();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            self.data_min.push(min);
            self.data_max.push(max);
            self.params.push(self.compute_params(&values, min, max));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data. Values outside the fitted range are not clipped.
    pub fn transform(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut result = x.to_owned();
        for (mut column, params) in result.axis_iter_mut(Axis(1)).zip(&self.params) {
            column.mapv_inplace(|v| (v - params.center) / params.scale);
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Per-column minimum seen during fit
    pub fn data_min(&self) -> &[f64] {
        &self.data_min
    }

    /// Per-column maximum seen during fit
    pub fn data_max(&self) -> &[f64] {
        &self.data_max
    }

    fn compute_params(&self, values: &[f64], min: f64, max: f64) -> ScalerParams {
        match self.scaler_type {
            ScalerType::Standard => {
                let n = values.len().max(1) as f64;
                let mean = values.iter().sum::<f64>() / n;
                // Population std
                let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
                ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                }
            }
            ScalerType::MinMax => {
                let range = max - min;
                ScalerParams {
                    center: if min.is_finite() { min } else { 0.0 },
                    scale: if range == 0.0 || !range.is_finite() { 1.0 } else { range },
                }
            }
            ScalerType::None => ScalerParams {
                center: 0.0,
                scale: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];

        let mut scaler = Scaler::new(ScalerType::Standard);
        let result = scaler.fit_transform(&x.view()).unwrap();

        let mean = result.column(0).mean().unwrap();
        assert!(mean.abs() < 1e-10); // Mean should be ~0
    }

    #[test]
    fn test_minmax_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [5.0, 50.0]];

        let mut scaler = Scaler::new(ScalerType::MinMax);
        let result = scaler.fit_transform(&x.view()).unwrap();

        assert!((result[[0, 0]] - 0.0).abs() < 1e-10);
        assert!((result[[3, 0]] - 1.0).abs() < 1e-10);
        assert!((result[[1, 1]] - 0.25).abs() < 1e-10);
        assert_eq!(scaler.data_min(), &[1.0, 10.0]);
        assert_eq!(scaler.data_max(), &[5.0, 50.0]);
    }

    #[test]
    fn test_minmax_no_clipping() {
        let train = array![[10.0], [20.0]];
        let test = array![[0.0], [40.0]];

        let mut scaler = Scaler::new(ScalerType::MinMax);
        scaler.fit(&train.view()).unwrap();
        let result = scaler.transform(&test.view()).unwrap();

        assert!((result[[0, 0]] + 1.0).abs() < 1e-10);
        assert!((result[[1, 0]] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_minmax_constant_column() {
        let x = array![[7.0], [7.0], [7.0]];
        let mut scaler = Scaler::new(ScalerType::MinMax);
        let result = scaler.fit_transform(&x.view()).unwrap();
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_transform_before_fit() {
        let scaler = Scaler::new(ScalerType::MinMax);
        let x = array![[1.0]];
        assert!(matches!(scaler.transform(&x.view()), Err(PredictorError::ModelNotFitted)));
    }
}
