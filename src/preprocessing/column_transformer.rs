//! Column transformer: numeric and categorical branches over fixed column ranges
//!
//! The numeric branch imputes then scales the first `n_numeric` columns, the
//! categorical branch imputes then encodes the remaining `n_categorical`
//! columns. Outputs are concatenated numeric first.

use crate::error::{PredictorError, Result};
use super::{
    config::PreprocessingConfig,
    encoder::Encoder,
    imputer::{ImputeValue, Imputer},
    scaler::Scaler,
    RawMatrix, Value,
};
use ndarray::{concatenate, s, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Disjoint, order-preserving column index ranges of the combined matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRanges {
    pub numeric: Range<usize>,
    pub categorical: Range<usize>,
}

impl ColumnRanges {
    /// Numeric columns occupy the first positions, categorical the rest
    pub fn from_counts(n_numeric: usize, n_categorical: usize) -> Self {
        Self {
            numeric: 0..n_numeric,
            categorical: n_numeric..n_numeric + n_categorical,
        }
    }

    /// Total number of input columns
    pub fn n_columns(&self) -> usize {
        self.categorical.end
    }
}

/// Learned state of both branches
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransformState {
    numeric_imputer: Imputer,
    scaler: Scaler,
    categorical_imputer: Imputer,
    encoder: Encoder,
}

/// Two-branch feature transform with state learned from training data only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    config: PreprocessingConfig,
    ranges: ColumnRanges,
    state: Option<TransformState>,
}

impl ColumnTransformer {
    /// Create a transformer for `n_numeric` numeric columns followed by
    /// `n_categorical` categorical columns
    pub fn new(n_numeric: usize, n_categorical: usize) -> Self {
        Self::with_config(n_numeric, n_categorical, PreprocessingConfig::default())
    }

    pub fn with_config(n_numeric: usize, n_categorical: usize, config: PreprocessingConfig) -> Self {
        Self {
            config,
            ranges: ColumnRanges::from_counts(n_numeric, n_categorical),
            state: None,
        }
    }

    /// Learn imputation, scaling and encoding parameters from `x`
    pub fn fit(&mut self, x: &RawMatrix) -> Result<&mut Self> {
        self.check_width(x)?;
        let numeric = x.slice(s![.., self.ranges.numeric.clone()]);
        let categorical = x.slice(s![.., self.ranges.categorical.clone()]);

        let mut numeric_imputer = Imputer::new(self.config.numeric_impute_strategy.clone());
        let imputed = numeric_imputer.fit_transform(&numeric)?;
        let mut scaler = Scaler::new(self.config.scaler_type.clone());
        scaler.fit(&to_numeric(&imputed.view())?.view())?;

        let mut categorical_imputer = Imputer::new(self.config.categorical_impute_strategy.clone());
        let imputed = categorical_imputer.fit_transform(&categorical)?;
        let mut encoder = Encoder::new(self.config.encoder_type.clone())
            .with_handle_unknown(self.config.handle_unknown);
        encoder.fit(&imputed.view())?;

        debug!(
            rows = x.nrows(),
            numeric = self.ranges.numeric.len(),
            indicators = encoder.n_features_out(),
            "Fitted column transformer"
        );

        self.state = Some(TransformState {
            numeric_imputer,
            scaler,
            categorical_imputer,
            encoder,
        });
        Ok(self)
    }

    /// Apply the fitted transform to any compatible matrix
    pub fn transform(&self, x: &RawMatrix) -> Result<Array2<f64>> {
        let state = self.state.as_ref().ok_or(PredictorError::ModelNotFitted)?;
        self.check_width(x)?;

        let numeric = x.slice(s![.., self.ranges.numeric.clone()]);
        let imputed = state.numeric_imputer.transform(&numeric)?;
        let scaled = state.scaler.transform(&to_numeric(&imputed.view())?.view())?;

        let categorical = x.slice(s![.., self.ranges.categorical.clone()]);
        let imputed = state.categorical_imputer.transform(&categorical)?;
        let encoded = state.encoder.transform(&imputed.view())?;

        Ok(concatenate(Axis(1), &[scaled.view(), encoded.view()])?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &RawMatrix) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn ranges(&self) -> &ColumnRanges {
        &self.ranges
    }

    /// Width of the transformed matrix, known once fitted
    pub fn n_features_out(&self) -> Option<usize> {
        self.state
            .as_ref()
            .map(|state| self.ranges.numeric.len() + state.encoder.n_features_out())
    }

    /// Per-column imputation means of the numeric branch
    pub fn numeric_means(&self) -> Option<Vec<f64>> {
        self.state.as_ref().map(|state| {
            state
                .numeric_imputer
                .fill_values()
                .iter()
                .map(|v| match v {
                    ImputeValue::Numeric(m) => *m,
                    ImputeValue::String(_) => f64::NAN,
                })
                .collect()
        })
    }

    /// Per-column (min, max) used by the numeric scaler
    pub fn numeric_ranges(&self) -> Option<Vec<(f64, f64)>> {
        self.state.as_ref().map(|state| {
            state
                .scaler
                .data_min()
                .iter()
                .copied()
                .zip(state.scaler.data_max().iter().copied())
                .collect()
        })
    }

    /// Category vocabularies of the categorical branch
    pub fn categories(&self) -> Option<&[Vec<String>]> {
        self.state.as_ref().map(|state| state.encoder.categories())
    }

    fn check_width(&self, x: &RawMatrix) -> Result<()> {
        if x.ncols() != self.ranges.n_columns() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} columns", self.ranges.n_columns()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(())
    }
}

/// Convert imputed numeric cells into a dense matrix
fn to_numeric(x: &ArrayView2<Value>) -> Result<Array2<f64>> {
    let values = x
        .iter()
        .map(|v| {
            v.as_number().ok_or_else(|| {
                PredictorError::PreprocessingError(format!("expected a numeric value, got '{}'", v))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(Array2::from_shape_vec(x.raw_dim(), values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn train_matrix() -> RawMatrix {
        array![
            [Value::Number(1.0), Value::Number(100.0), Value::from("RL")],
            [Value::Missing, Value::Number(300.0), Value::from("RM")],
            [Value::Number(5.0), Value::Number(200.0), Value::Missing],
        ]
    }

    #[test]
    fn test_column_ranges() {
        let ranges = ColumnRanges::from_counts(7, 1);
        assert_eq!(ranges.numeric, 0..7);
        assert_eq!(ranges.categorical, 7..8);
        assert_eq!(ranges.n_columns(), 8);
    }

    #[test]
    fn test_fit_transform_layout() {
        let mut transformer = ColumnTransformer::new(2, 1);
        let out = transformer.fit_transform(&train_matrix()).unwrap();

        // 2 scaled numeric columns + {RL, RM, missing}
        assert_eq!(out.shape(), &[3, 5]);
        assert_eq!(transformer.n_features_out(), Some(5));
        assert_eq!(
            transformer.categories().unwrap(),
            &[vec!["RL".to_string(), "RM".to_string(), "missing".to_string()]]
        );

        // Missing numeric value imputed with mean 3.0 -> (3 - 1) / 4
        assert!((out[[1, 0]] - 0.5).abs() < 1e-12);
        assert!((out[[0, 1]] - 0.0).abs() < 1e-12);
        assert!((out[[1, 1]] - 1.0).abs() < 1e-12);
        assert_eq!(out.slice(s![2, 2..]).to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transform_does_not_refit() {
        let mut transformer = ColumnTransformer::new(2, 1);
        transformer.fit(&train_matrix()).unwrap();
        let means = transformer.numeric_means().unwrap();
        let ranges = transformer.numeric_ranges().unwrap();

        let test = array![[Value::Number(50.0), Value::Missing, Value::from("C (all)")]];
        let out = transformer.transform(&test).unwrap();

        assert_eq!(transformer.numeric_means().unwrap(), means);
        assert_eq!(transformer.numeric_ranges().unwrap(), ranges);
        // Out of range values are scaled linearly, unknown category is all zeros
        assert!((out[[0, 0]] - 12.25).abs() < 1e-12);
        assert!((out[[0, 1]] - 0.5).abs() < 1e-12);
        assert!(out.slice(s![0, 2..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_transform_before_fit() {
        let transformer = ColumnTransformer::new(2, 1);
        assert!(matches!(
            transformer.transform(&train_matrix()),
            Err(PredictorError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let mut transformer = ColumnTransformer::new(3, 1);
        assert!(matches!(
            transformer.fit(&train_matrix()),
            Err(PredictorError::ShapeError { .. })
        ));
    }
}
