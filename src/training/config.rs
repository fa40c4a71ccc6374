//! Training configuration: feature set, outlier rule and search settings

use crate::error::{PredictorError, Result};
use crate::optimizer::{ParamGrid, SearchConfig};
use crate::preprocessing::PreprocessingConfig;
use serde::{Deserialize, Serialize};

/// Fixed, ordered partition of the input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Numerical feature names, in matrix order
    pub numeric: Vec<String>,
    /// Categorical feature names, following the numerical ones
    pub categorical: Vec<String>,
    /// Target column of the training file
    pub target: String,
    /// Identifier column of the test file
    pub id: String,
}

impl Default for FeatureSet {
    fn default() -> Self {
        let names = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect();
        Self {
            numeric: names(&[
                "OverallQual",
                "GrLivArea",
                "GarageArea",
                "TotalBsmtSF",
                "FullBath",
                "TotRmsAbvGrd",
                "YearBuilt",
            ]),
            categorical: names(&["MSZoning"]),
            target: "SalePrice".to_string(),
            id: "Id".to_string(),
        }
    }
}

impl FeatureSet {
    /// All feature names, numerical first
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.numeric.iter().chain(&self.categorical).map(String::as_str)
    }

    pub fn n_numeric(&self) -> usize {
        self.numeric.len()
    }

    pub fn n_categorical(&self) -> usize {
        self.categorical.len()
    }
}

/// Training rows whose numerical feature at `feature_index` exceeds
/// `threshold` are dropped before fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRule {
    pub feature_index: usize,
    pub threshold: f64,
}

impl Default for OutlierRule {
    fn default() -> Self {
        // TotalBsmtSF
        Self {
            feature_index: 3,
            threshold: 5499.0,
        }
    }
}

/// Configuration for the whole training run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub features: FeatureSet,
    pub outlier: OutlierRule,
    pub preprocessing: PreprocessingConfig,
    pub search: SearchConfig,
    pub grid: ParamGrid,
}

impl TrainingConfig {
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_grid(mut self, grid: ParamGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Name of the column checked by the outlier rule
    pub fn outlier_column(&self) -> Result<&str> {
        self.features
            .numeric
            .get(self.outlier.feature_index)
            .map(String::as_str)
            .ok_or_else(|| {
                PredictorError::ConfigError(format!(
                    "outlier feature index {} is out of range for {} numerical features",
                    self.outlier.feature_index,
                    self.features.n_numeric()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_feature_set() {
        let features = FeatureSet::default();
        assert_eq!(features.n_numeric(), 7);
        assert_eq!(features.n_categorical(), 1);
        let columns: Vec<&str> = features.columns().collect();
        assert_eq!(columns.first(), Some(&"OverallQual"));
        assert_eq!(columns.last(), Some(&"MSZoning"));
    }

    #[test]
    fn test_outlier_column() {
        let config = TrainingConfig::default();
        assert_eq!(config.outlier_column().unwrap(), "TotalBsmtSF");
        assert_eq!(config.outlier.threshold, 5499.0);
    }

    #[test]
    fn test_outlier_index_out_of_range() {
        let mut config = TrainingConfig::default();
        config.outlier.feature_index = 7;
        assert!(matches!(config.outlier_column(), Err(PredictorError::ConfigError(_))));
    }
}
