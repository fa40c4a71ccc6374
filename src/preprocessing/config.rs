//! Preprocessing configuration

use serde::{Deserialize, Serialize};
use super::{ScalerType, EncoderType, ImputeStrategy, UnknownCategory};

/// Placeholder category used for missing categorical values
pub const MISSING_CATEGORY: &str = "missing";

/// Configuration for the numeric and categorical branches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Strategy for handling missing numeric values
    pub numeric_impute_strategy: ImputeStrategy,

    /// Strategy for handling missing categorical values
    pub categorical_impute_strategy: ImputeStrategy,

    /// Type of scaler to use for numeric features
    pub scaler_type: ScalerType,

    /// Type of encoder to use for categorical features
    pub encoder_type: EncoderType,

    /// What the encoder does with categories never seen during fit
    pub handle_unknown: UnknownCategory,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            numeric_impute_strategy: ImputeStrategy::Mean,
            categorical_impute_strategy: ImputeStrategy::ConstantString(MISSING_CATEGORY.to_string()),
            scaler_type: ScalerType::MinMax,
            encoder_type: EncoderType::OneHot,
            handle_unknown: UnknownCategory::Ignore,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set numeric impute strategy
    pub fn with_numeric_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.numeric_impute_strategy = strategy;
        self
    }

    /// Builder method to set categorical impute strategy
    pub fn with_categorical_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.categorical_impute_strategy = strategy;
        self
    }

    /// Builder method to set scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }

    /// Builder method to set how unknown categories are handled
    pub fn with_handle_unknown(mut self, handle_unknown: UnknownCategory) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }
}
