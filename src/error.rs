//! Error types for the house price pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PredictorError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Optimization error: {0}")]
    OptimizationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

impl From<polars::error::PolarsError> for PredictorError {
    fn from(err: polars::error::PolarsError) -> Self {
        PredictorError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(err: serde_json::Error) -> Self {
        PredictorError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PredictorError {
    fn from(err: ndarray::ShapeError) -> Self {
        PredictorError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
