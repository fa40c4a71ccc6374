//! Utility functions and types

mod parallel;
pub mod data_loader;

pub use parallel::{ParallelConfig, parallel_map_with_config, run_sequential};
pub use data_loader::{DataLoader, HousingData, PredictionTable, TestSet, TrainingSet};
