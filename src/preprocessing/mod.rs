//! Data preprocessing module
//!
//! Provides the feature transformation used in front of the regressor:
//! - Missing value imputation (mean / median / constant)
//! - Min-max and standard scaling of numeric columns
//! - One-hot encoding of categorical columns
//! - A column transformer that runs a numeric and a categorical branch over
//!   disjoint column ranges and concatenates their outputs

mod config;
mod imputer;
mod scaler;
mod encoder;
pub mod column_transformer;

pub use config::PreprocessingConfig;
pub use imputer::{Imputer, ImputeStrategy, ImputeValue};
pub use scaler::{Scaler, ScalerType};
pub use encoder::{Encoder, EncoderType, UnknownCategory};
pub use column_transformer::{ColumnRanges, ColumnTransformer};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw feature matrix as loaded from a table: one cell per row and column
pub type RawMatrix = Array2<Value>;

/// A single scalar cell of a raw dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Numeric view of the cell. Text is parsed; missing and NaN give `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(*v),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// Category label of the cell, `None` when missing
    pub fn as_category(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Number(v) if !v.is_nan() => Some(v.to_string()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(v) => v.is_nan(),
            Value::Text(_) => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Missing
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() { Value::Missing } else { Value::Number(v) }
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map(Value::from).unwrap_or(Value::Missing)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Option<&str>> for Value {
    fn from(s: Option<&str>) -> Self {
        s.map(Value::from).unwrap_or(Value::Missing)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
