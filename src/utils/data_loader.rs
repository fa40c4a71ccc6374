//! Dataset loading and prediction writing
//!
//! Reads `train.csv` and `test.csv` with polars, drops training outliers,
//! and extracts the raw feature matrices in feature-set order.

use crate::error::{PredictorError, Result};
use crate::preprocessing::{RawMatrix, Value};
use crate::training::{FeatureSet, OutlierRule, TrainingConfig};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

pub const TRAIN_FILE: &str = "train.csv";
pub const TEST_FILE: &str = "test.csv";

/// Tokens read as missing, besides empty fields. Same set pandas uses.
const DEFAULT_NULL_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Training features and target after outlier removal
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub features: RawMatrix,
    pub target: Array1<f64>,
    /// Rows removed by the outlier rule
    pub n_dropped: usize,
}

/// Test features and the identifier column, in file order
#[derive(Debug, Clone)]
pub struct TestSet {
    pub features: RawMatrix,
    pub ids: Column,
}

/// Both halves of a dataset directory
#[derive(Debug, Clone)]
pub struct HousingData {
    pub train: TrainingSet,
    pub test: TestSet,
}

/// CSV loader bound to a feature set and outlier rule
#[derive(Debug, Clone)]
pub struct DataLoader {
    features: FeatureSet,
    outlier: OutlierRule,
    null_values: Vec<String>,
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(&TrainingConfig::default())
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            features: config.features.clone(),
            outlier: config.outlier.clone(),
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            infer_schema_length: Some(1000),
        }
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        if !path.is_file() {
            return Err(PredictorError::DataError(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let null_values = NullValues::AllColumns(
            self.null_values.iter().map(|v| v.as_str().into()).collect(),
        );
        let parse_options = CsvParseOptions::default().with_null_values(Some(null_values));

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_options)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        info!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded dataset");
        Ok(df)
    }

    /// Load `train.csv` and `test.csv` from `dir`
    pub fn load_dir(&self, dir: &Path) -> Result<HousingData> {
        let train = self.load_train(&dir.join(TRAIN_FILE))?;
        let test = self.load_test(&dir.join(TEST_FILE))?;
        Ok(HousingData { train, test })
    }

    /// Load the training file, drop outliers and split off the target
    pub fn load_train(&self, path: &Path) -> Result<TrainingSet> {
        let df = self.load_csv(path)?;
        self.require_columns(&df, std::iter::once(self.features.target.as_str()))?;
        let (df, n_dropped) = self.drop_outliers(df)?;

        let target = numeric_column(&df, &self.features.target)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.filter(|t| !t.is_nan()).ok_or_else(|| {
                    PredictorError::DataError(format!(
                        "missing {} in training row {}",
                        self.features.target, row
                    ))
                })
            })
            .collect::<Result<Array1<f64>>>()?;

        Ok(TrainingSet {
            features: self.feature_matrix(&df)?,
            target,
            n_dropped,
        })
    }

    /// Load the test file. Test rows are never filtered.
    pub fn load_test(&self, path: &Path) -> Result<TestSet> {
        let df = self.load_csv(path)?;
        self.require_columns(&df, std::iter::once(self.features.id.as_str()))?;

        Ok(TestSet {
            features: self.feature_matrix(&df)?,
            ids: df.column(&self.features.id)?.clone(),
        })
    }

    /// Remove rows whose outlier column exceeds the threshold. Missing
    /// values are kept.
    pub fn drop_outliers(&self, df: DataFrame) -> Result<(DataFrame, usize)> {
        let column = self
            .features
            .numeric
            .get(self.outlier.feature_index)
            .ok_or_else(|| {
                PredictorError::ConfigError(format!(
                    "outlier feature index {} is out of range",
                    self.outlier.feature_index
                ))
            })?;
        let threshold = self.outlier.threshold;

        let keep: BooleanChunked = numeric_column(&df, column)?
            .into_iter()
            .map(|v| Some(!matches!(v, Some(x) if x > threshold)))
            .collect();

        let before = df.height();
        let filtered = df.filter(&keep)?;
        let n_dropped = before - filtered.height();
        if n_dropped > 0 {
            info!(dropped = n_dropped, column = %column, threshold, "Dropped outlier rows");
        }
        Ok((filtered, n_dropped))
    }

    /// Raw feature matrix with numerical columns first, then categorical
    pub fn feature_matrix(&self, df: &DataFrame) -> Result<RawMatrix> {
        self.require_columns(df, self.features.columns())?;

        let mut columns: Vec<Vec<Value>> = Vec::new();
        for name in &self.features.numeric {
            columns.push(
                numeric_column(df, name)?
                    .into_iter()
                    .map(Value::from)
                    .collect(),
            );
        }
        for name in &self.features.categorical {
            let series = df
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::String)?;
            columns.push(series.str()?.into_iter().map(Value::from).collect());
        }

        Ok(Array2::from_shape_fn((df.height(), columns.len()), |(row, col)| {
            columns[col][row].clone()
        }))
    }

    fn require_columns<'a>(&self, df: &DataFrame, names: impl Iterator<Item = &'a str>) -> Result<()> {
        for name in names {
            if df.column(name).is_err() {
                return Err(PredictorError::FeatureNotFound(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Column cast to f64; unparseable fields become missing
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .map_err(|_| PredictorError::FeatureNotFound(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Identifier column joined with predicted prices
#[derive(Debug, Clone)]
pub struct PredictionTable {
    df: DataFrame,
}

impl PredictionTable {
    pub fn new(ids: &Column, predictions: &Array1<f64>, target: &str) -> Result<Self> {
        if ids.len() != predictions.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} predictions", ids.len()),
                actual: format!("{} predictions", predictions.len()),
            });
        }
        let prices = Column::new(target.into(), predictions.to_vec());
        let df = DataFrame::new(vec![ids.clone(), prices])?;
        Ok(Self { df })
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Write as CSV, creating parent directories as needed
    pub fn write_csv(&mut self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut self.df)?;

        info!(path = %path.display(), rows = self.df.height(), "Wrote predictions");
        Ok(path.to_path_buf())
    }
}
