//! Integration test: Full pipeline (load → search → refit → predict → write)

use clap::Parser;
use house_price_automl::cli::{run, run_with_config, Cli};
use house_price_automl::optimizer::{GridSearchCV, ParamGrid, SearchConfig};
use house_price_automl::training::{ModelPipeline, PipelineState, TrainingConfig, XGBoostConfig};
use house_price_automl::utils::DataLoader;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn write_csv(df: &mut DataFrame, path: &Path) {
    let mut file = File::create(path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
}

fn read_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .unwrap()
        .finish()
        .unwrap()
}

fn three_row_train() -> DataFrame {
    df!(
        "Id" => &[1i64, 2, 3],
        "OverallQual" => &[7i64, 6, 7],
        "GrLivArea" => &[1710i64, 1262, 1786],
        "GarageArea" => &[548i64, 460, 608],
        "TotalBsmtSF" => &[856i64, 1262, 920],
        "FullBath" => &[2i64, 2, 2],
        "TotRmsAbvGrd" => &[8i64, 6, 6],
        "YearBuilt" => &[2003i64, 1976, 2001],
        "MSZoning" => &["RL", "RL", "RM"],
        "SalePrice" => &[208500i64, 181500, 223500]
    )
    .unwrap()
}

fn one_row_test() -> DataFrame {
    df!(
        "Id" => &[1461i64],
        "OverallQual" => &[5i64],
        "GrLivArea" => &[896i64],
        "GarageArea" => &[730i64],
        "TotalBsmtSF" => &[882i64],
        "FullBath" => &[1i64],
        "TotRmsAbvGrd" => &[5i64],
        "YearBuilt" => &[1961i64],
        "MSZoning" => &["RH"]
    )
    .unwrap()
}

fn larger_train(n: usize, outlier_row: Option<usize>) -> DataFrame {
    let zones = ["RL", "RM", "FV", "RH"];
    let qual: Vec<i64> = (0..n).map(|i| (i % 10) as i64 + 1).collect();
    let area: Vec<i64> = (0..n).map(|i| 800 + 25 * i as i64).collect();
    let bsmt: Vec<i64> = (0..n)
        .map(|i| if Some(i) == outlier_row { 6110 } else { 600 + 10 * i as i64 })
        .collect();
    let price: Vec<i64> = (0..n).map(|i| 100000 + 15000 * qual[i] + 30 * area[i]).collect();
    let zoning: Vec<&str> = (0..n).map(|i| zones[i % zones.len()]).collect();

    df!(
        "Id" => &(1..=n as i64).collect::<Vec<_>>(),
        "OverallQual" => &qual,
        "GrLivArea" => &area,
        "GarageArea" => &area.iter().map(|a| a / 3).collect::<Vec<_>>(),
        "TotalBsmtSF" => &bsmt,
        "FullBath" => &qual.iter().map(|q| 1 + q / 5).collect::<Vec<_>>(),
        "TotRmsAbvGrd" => &qual.iter().map(|q| 3 + q / 2).collect::<Vec<_>>(),
        "YearBuilt" => &(0..n as i64).map(|i| 1950 + i).collect::<Vec<_>>(),
        "MSZoning" => &zoning,
        "SalePrice" => &price
    )
    .unwrap()
}

fn small_grid_config() -> TrainingConfig {
    TrainingConfig::default()
        .with_grid(ParamGrid {
            n_estimators: vec![20, 40],
            max_depth: vec![3],
            learning_rate: vec![0.3, 0.1],
            reg_alpha: vec![0.1],
        })
        .with_search(SearchConfig::new().with_cv_folds(5))
}

#[test]
fn test_three_row_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_csv(&mut three_row_train(), &dir.path().join("train.csv"));
    write_csv(&mut one_row_test(), &dir.path().join("test.csv"));

    let pred = dir.path().join("out").join("nested").join("pred.csv");
    let cli = Cli::parse_from([
        "house-price-automl",
        "--data",
        dir.path().to_str().unwrap(),
        "--pred",
        pred.to_str().unwrap(),
    ]);
    run(&cli).unwrap();

    let out = read_csv(&pred);
    assert_eq!(out.height(), 1);
    let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["Id", "SalePrice"]);

    let id = out.column("Id").unwrap().as_materialized_series().cast(&DataType::Int64).unwrap();
    assert_eq!(id.i64().unwrap().get(0), Some(1461));

    let price = out
        .column("SalePrice")
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap();
    let value = price.f64().unwrap().get(0).unwrap();
    assert!(value.is_finite());
}

#[test]
fn test_outlier_removed_from_training_only() {
    let dir = TempDir::new().unwrap();
    write_csv(&mut larger_train(30, Some(4)), &dir.path().join("train.csv"));

    let mut test = one_row_test();
    test.with_column(Series::new("TotalBsmtSF".into(), &[9882i64])).unwrap();
    write_csv(&mut test, &dir.path().join("test.csv"));

    let config = small_grid_config();
    let data = DataLoader::new(&config).load_dir(dir.path()).unwrap();
    assert_eq!(data.train.n_dropped, 1);
    assert_eq!(data.train.features.nrows(), 29);
    assert_eq!(data.test.features.nrows(), 1);

    let mut search = GridSearchCV::new(
        ModelPipeline::new(7, 1),
        config.grid.clone(),
        config.search.clone(),
    );
    search.fit(&data.train.features, &data.train.target).unwrap();

    // The fitted scaler never saw the outlier value
    match search.best_estimator().unwrap().state() {
        PipelineState::Fitted { transformer, .. } => {
            let (_, max) = transformer.numeric_ranges().unwrap()[3];
            assert!(max <= 5499.0);
        }
        PipelineState::Unfitted => panic!("best estimator should be fitted"),
    }

    let predictions = search.predict(&data.test.features).unwrap();
    assert_eq!(predictions.len(), 1);
}

#[test]
fn test_predictions_follow_test_row_order() {
    let dir = TempDir::new().unwrap();
    write_csv(&mut larger_train(25, None), &dir.path().join("train.csv"));

    let mut test = larger_train(6, None).drop("SalePrice").unwrap();
    let ids = Series::new("Id".into(), &[906i64, 12, 500, 3, 77, 1]);
    test.with_column(ids).unwrap();
    write_csv(&mut test, &dir.path().join("test.csv"));

    let pred = dir.path().join("pred.csv");
    let report = dir.path().join("reports").join("cv.json");
    let cli = Cli::parse_from([
        "house-price-automl",
        "--data",
        dir.path().to_str().unwrap(),
        "--pred",
        pred.to_str().unwrap(),
        "--cv-results",
        report.to_str().unwrap(),
        "--jobs",
        "2",
    ]);
    run_with_config(&cli, small_grid_config()).unwrap();

    let out = read_csv(&pred);
    let ids: Vec<Option<i64>> = out
        .column("Id")
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(ids, vec![Some(906), Some(12), Some(500), Some(3), Some(77), Some(1)]);

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["trials"].as_array().unwrap().len(), 4);
    assert_eq!(report["n_folds"], 5);
}

#[test]
fn test_missing_test_file_fails() {
    let dir = TempDir::new().unwrap();
    write_csv(&mut three_row_train(), &dir.path().join("train.csv"));

    let cli = Cli::parse_from([
        "house-price-automl",
        "--data",
        dir.path().to_str().unwrap(),
        "--pred",
        dir.path().join("pred.csv").to_str().unwrap(),
    ]);
    assert!(run(&cli).is_err());
    assert!(!dir.path().join("pred.csv").exists());
}

#[test]
fn test_missing_required_column_fails() {
    let dir = TempDir::new().unwrap();
    let mut train = three_row_train().drop("MSZoning").unwrap();
    write_csv(&mut train, &dir.path().join("train.csv"));
    write_csv(&mut one_row_test(), &dir.path().join("test.csv"));

    let config = TrainingConfig::default();
    assert!(DataLoader::new(&config).load_dir(dir.path()).is_err());
}

#[test]
fn test_direct_pipeline_on_loaded_data() {
    let dir = TempDir::new().unwrap();
    write_csv(&mut larger_train(30, None), &dir.path().join("train.csv"));
    write_csv(&mut one_row_test(), &dir.path().join("test.csv"));

    let data = DataLoader::default().load_dir(dir.path()).unwrap();
    let mut pipeline = ModelPipeline::new(7, 1)
        .with_params(XGBoostConfig::default().with_n_estimators(50).with_max_depth(3));
    pipeline.fit(&data.train.features, &data.train.target).unwrap();
    assert!(pipeline.score(&data.train.features, &data.train.target).unwrap() > 0.9);
}
