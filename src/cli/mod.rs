//! House price CLI
//!
//! Loads the training and test tables, runs the cross-validated grid search,
//! refits the best pipeline and writes test-set predictions.

use clap::Parser;
use colored::*;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::optimizer::{GridSearchCV, SearchResult};
use crate::training::{ModelMetrics, ModelPipeline, TrainingConfig};
use crate::utils::{DataLoader, PredictionTable};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("  {} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "house-price-automl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "house price prediction")]
#[command(long_about = None)]
pub struct Cli {
    /// Dir path to read the train/test datasets
    #[arg(long)]
    pub data: PathBuf,

    /// Prediction file path
    #[arg(long)]
    pub pred: PathBuf,

    /// Worker threads for the grid search (default: all cores)
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Write the per-candidate search report as JSON
    #[arg(long)]
    pub cv_results: Option<PathBuf>,
}

impl Cli {
    fn training_config(&self) -> TrainingConfig {
        let mut config = TrainingConfig::default();
        if let Some(jobs) = self.jobs {
            config.search = config.search.with_n_jobs(jobs);
        }
        config
    }
}

/// Run the full workflow described by `cli`
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    run_with_config(cli, cli.training_config())
}

/// Run the workflow with an explicit training configuration
pub fn run_with_config(cli: &Cli, config: TrainingConfig) -> anyhow::Result<()> {
    section("Load");
    step_run("Loading datasets");
    let start = Instant::now();
    let loader = DataLoader::new(&config);
    let data = loader.load_dir(&cli.data)?;
    step_done(&format!(
        "{} train rows, {} test rows in {:?}",
        data.train.features.nrows(),
        data.test.features.nrows(),
        start.elapsed()
    ));
    kv(
        "Outliers",
        &format!(
            "{} dropped ({} > {})",
            data.train.n_dropped,
            config.outlier_column()?,
            config.outlier.threshold
        ),
    );

    section("Search");
    step_run(&format!("Grid search over {} candidates", config.grid.len()));
    let start = Instant::now();
    let estimator = ModelPipeline::new(config.features.n_numeric(), config.features.n_categorical())
        .with_preprocessing(config.preprocessing.clone());
    let mut search = GridSearchCV::new(estimator, config.grid.clone(), config.search.clone());
    let result = search.fit(&data.train.features, &data.train.target)?.clone();
    step_done(&format!("{} folds in {:?}", result.n_folds, start.elapsed()));

    println!("{}", serde_json::to_string(result.best_params())?);
    println!("{}", result.best_score());

    if let Some(path) = &cli.cv_results {
        write_report(&result, path)?;
        kv("Report", &path.display().to_string());
    }

    let model = search.into_best_estimator()?;
    let train_predictions = model.predict(&data.train.features)?;
    let metrics = ModelMetrics::compute_regression(&data.train.target, &train_predictions);
    kv("Train R²", &format!("{:.4}", metrics.r2.unwrap_or(f64::NAN)));
    kv("Train RMSE", &format!("{:.2}", metrics.rmse.unwrap_or(f64::NAN)));
    kv("Train MAE", &format!("{:.2}", metrics.mae.unwrap_or(f64::NAN)));

    section("Predict");
    step_run("Predicting test set");
    let predictions = model.predict(&data.test.features)?;
    let mut table = PredictionTable::new(&data.test.ids, &predictions, &config.features.target)?;
    let path = table.write_csv(&cli.pred)?;
    step_done(&format!("{} rows → {}", table.height(), path.display()));
    println!();

    Ok(())
}

fn write_report(result: &SearchResult, path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(result)?)?;
    Ok(())
}
