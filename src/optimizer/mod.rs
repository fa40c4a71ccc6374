//! Hyperparameter search
//!
//! Exhaustive grid search with k-fold cross-validation over the boosted
//! regressor's tree count, depth, learning rate and L1 regularization.

mod config;
mod search_space;
pub mod grid_search;

pub use config::SearchConfig;
pub use search_space::{CandidateParams, ParamGrid};
pub use grid_search::{GridSearchCV, SearchResult, TrialResult};
