//! Categorical encoding implementations

use crate::error::{PredictorError, Result};
use super::Value;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Type of encoder to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncoderType {
    /// One binary indicator column per observed category
    OneHot,
}

/// Behaviour for categories that were not observed during fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownCategory {
    /// Encode as an all-zero indicator row
    Ignore,
    /// Fail the transform
    Error,
}

/// Categorical encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encoder {
    encoder_type: EncoderType,
    handle_unknown: UnknownCategory,
    // Sorted category vocabulary per input column
    categories: Vec<Vec<String>>,
    is_fitted: bool,
}

impl Encoder {
    /// Create a new encoder
    pub fn new(encoder_type: EncoderType) -> Self {
        Self {
            encoder_type,
            handle_unknown: UnknownCategory::Ignore,
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    /// Set how unknown categories are handled at transform time
    pub fn with_handle_unknown(mut self, handle_unknown: UnknownCategory) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, x: &ArrayView2<Value>) -> Result<&mut Self> {
        self.categories = x
            .axis_iter(Axis(1))
            .map(|column| {
                column
                    .iter()
                    .filter_map(Value::as_category)
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, x: &ArrayView2<Value>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        if x.ncols() != self.categories.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} columns", self.categories.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        match self.encoder_type {
            EncoderType::OneHot => self.transform_onehot(x),
        }
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &ArrayView2<Value>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Category vocabulary per input column, in output order
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Number of output columns produced by `transform`
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    fn transform_onehot(&self, x: &ArrayView2<Value>) -> Result<Array2<f64>> {
        let mut result = Array2::zeros((x.nrows(), self.n_features_out()));

        let mut offset = 0;
        for (col_idx, (column, vocabulary)) in x.axis_iter(Axis(1)).zip(&self.categories).enumerate() {
            for (row_idx, value) in column.iter().enumerate() {
                let Some(category) = value.as_category() else {
                    continue;
                };
                match vocabulary.binary_search(&category) {
                    Ok(pos) => result[[row_idx, offset + pos]] = 1.0,
                    Err(_) if self.handle_unknown == UnknownCategory::Ignore => {}
                    Err(_) => {
                        return Err(PredictorError::PreprocessingError(format!(
                            "unknown category '{}' in column {}",
                            category, col_idx
                        )));
                    }
                }
            }
            offset += vocabulary.len();
        }

        Ok(result)
    }
}
