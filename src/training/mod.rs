//! Model training module
//!
//! Provides the boosted tree regressor, the fit/predict pipeline that chains
//! it with the column transformer, k-fold splitting and regression metrics.

mod config;
mod models;
pub mod cross_validation;
pub mod pipeline;
pub mod xgboost;

pub use config::{FeatureSet, OutlierRule, TrainingConfig};
pub use models::{r2_score, ModelMetrics};
pub use cross_validation::{CVResults, CVSplit, KFold};
pub use pipeline::{ModelPipeline, PipelineState};
pub use xgboost::{XGBoostConfig, XGBoostRegressor};
