//! House price prediction with a cross-validated boosted tree pipeline
//!
//! # Modules
//!
//! - [`preprocessing`] - Imputation, scaling, one-hot encoding and the column transformer
//! - [`training`] - Boosted tree regressor, model pipeline, k-fold splitting, metrics
//! - [`optimizer`] - Exhaustive grid search with cross-validation
//! - [`utils`] - CSV loading, prediction writing, worker pool helpers
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod optimizer;

// Services
pub mod cli;
pub mod utils;

pub use error::{PredictorError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{PredictorError, Result};
    pub use crate::optimizer::{CandidateParams, GridSearchCV, ParamGrid, SearchConfig, SearchResult};
    pub use crate::preprocessing::{ColumnTransformer, PreprocessingConfig, RawMatrix, Value};
    pub use crate::training::{
        FeatureSet, KFold, ModelMetrics, ModelPipeline, OutlierRule, TrainingConfig, XGBoostConfig,
        XGBoostRegressor,
    };
    pub use crate::utils::{DataLoader, PredictionTable};
}
