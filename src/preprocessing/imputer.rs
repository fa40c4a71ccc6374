//! Missing value imputation strategies

use crate::error::{PredictorError, Result};
use super::Value;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the column mean (numeric only)
    Mean,
    /// Replace with the column median (numeric only)
    Median,
    /// Replace with a constant value
    Constant(f64),
    /// Replace with a constant string (categorical)
    ConstantString(String),
}

/// Learned replacement for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeValue {
    Numeric(f64),
    String(String),
}

impl ImputeValue {
    fn to_value(&self) -> Value {
        match self {
            ImputeValue::Numeric(v) => Value::Number(*v),
            ImputeValue::String(s) => Value::Text(s.clone()),
        }
    }
}

/// Imputer for handling missing values, one fill value per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: Vec<ImputeValue>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, x: &ArrayView2<Value>) -> Result<&mut Self> {
        self.fill_values = x
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(col_idx, column)| self.compute_fill_value(col_idx, column.iter()))
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data by imputing missing values
    pub fn transform(&self, x: &ArrayView2<Value>) -> Result<Array2<Value>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        if x.ncols() != self.fill_values.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} columns", self.fill_values.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut result = x.to_owned();
        for (mut column, fill_value) in result.axis_iter_mut(Axis(1)).zip(&self.fill_values) {
            for cell in column.iter_mut().filter(|c| c.is_missing()) {
                *cell = fill_value.to_value();
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &ArrayView2<Value>) -> Result<Array2<Value>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Fill values learned during fit, one per column
    pub fn fill_values(&self) -> &[ImputeValue] {
        &self.fill_values
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn compute_fill_value<'a>(
        &self,
        col_idx: usize,
        column: impl Iterator<Item = &'a Value>,
    ) -> Result<ImputeValue> {
        match &self.strategy {
            ImputeStrategy::Mean => {
                let values = observed_numbers(col_idx, column)?;
                if values.is_empty() {
                    warn!(column = col_idx, "No observed values, imputing with 0.0");
                    return Ok(ImputeValue::Numeric(0.0));
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                Ok(ImputeValue::Numeric(mean))
            }
            ImputeStrategy::Median => {
                let mut values = observed_numbers(col_idx, column)?;
                if values.is_empty() {
                    warn!(column = col_idx, "No observed values, imputing with 0.0");
                    return Ok(ImputeValue::Numeric(0.0));
                }
                values.sort_by(|a, b| a.total_cmp(b));
                let mid = values.len() / 2;
                let median = if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                };
                Ok(ImputeValue::Numeric(median))
            }
            ImputeStrategy::Constant(val) => Ok(ImputeValue::Numeric(*val)),
            ImputeStrategy::ConstantString(val) => Ok(ImputeValue::String(val.clone())),
        }
    }
}

/// Non-missing numeric values of a column; text that is not a number is an error
fn observed_numbers<'a>(col_idx: usize, column: impl Iterator<Item = &'a Value>) -> Result<Vec<f64>> {
    column
        .filter(|v| !v.is_missing())
        .map(|v| {
            v.as_number().ok_or_else(|| {
                PredictorError::PreprocessingError(format!(
                    "column {} holds non-numeric value '{}'",
                    col_idx, v
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_imputer_creation() {
        let imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(!imputer.is_fitted());
    }

    #[test]
    fn test_impute_strategy_serialize() {
        let strategy = ImputeStrategy::ConstantString("missing".to_string());
        let json = serde_json::to_string(&strategy).unwrap();
        assert!(json.contains("ConstantString"));
        assert!(json.contains("missing"));
    }

    #[test]
    fn test_mean_imputation() {
        let x = array![
            [Value::Number(1.0)],
            [Value::Missing],
            [Value::Number(3.0)],
            [Value::Number(4.0)],
        ];

        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let result = imputer.fit_transform(&x.view()).unwrap();

        // Mean of [1, 3, 4] = 8/3
        let filled = result[[1, 0]].as_number().unwrap();
        assert!((filled - 2.666666666666667).abs() < 1e-9);
        assert_eq!(result[[0, 0]], Value::Number(1.0));
    }

    #[test]
    fn test_median_imputation() {
        let x = array![
            [Value::Number(1.0)],
            [Value::Number(10.0)],
            [Value::Missing],
            [Value::Number(2.0)],
        ];

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        let result = imputer.fit_transform(&x.view()).unwrap();
        assert_eq!(result[[2, 0]], Value::Number(2.0));
    }

    #[test]
    fn test_constant_string_imputation() {
        let x = array![[Value::from("RL")], [Value::Missing]];

        let mut imputer = Imputer::new(ImputeStrategy::ConstantString("missing".into()));
        let result = imputer.fit_transform(&x.view()).unwrap();
        assert_eq!(result[[1, 0]], Value::Text("missing".into()));
        assert_eq!(result[[0, 0]], Value::Text("RL".into()));
    }

    #[test]
    fn test_fill_values_come_from_fit_data_only() {
        let train = array![[Value::Number(2.0)], [Value::Number(4.0)]];
        let test = array![[Value::Number(100.0)], [Value::Missing]];

        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        imputer.fit(&train.view()).unwrap();
        let result = imputer.transform(&test.view()).unwrap();

        assert_eq!(imputer.fill_values(), &[ImputeValue::Numeric(3.0)]);
        assert_eq!(result[[1, 0]], Value::Number(3.0));
    }

    #[test]
    fn test_transform_before_fit() {
        let imputer = Imputer::new(ImputeStrategy::Mean);
        let x = array![[Value::Number(1.0)]];
        assert!(matches!(
            imputer.transform(&x.view()),
            Err(PredictorError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_non_numeric_mean_is_error() {
        let x = array![[Value::from("abc")]];
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(imputer.fit(&x.view()).is_err());
    }
}
