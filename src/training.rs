//! Model training and selection under the fixed evaluation protocol

use crate::artifact::ModelArtifact;
use crate::data::SalesRecord;
use crate::encoding::EncodingTable;
use crate::error::{ForecastError, Result};
use crate::features::{training_table, FeatureRow, FEATURE_COLUMNS};
use crate::metrics::{evaluate, RegressionMetrics};
use crate::models::{GradientBoosting, RandomForest, RegressorModel, TrainedRegressor};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Options controlling the training run
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Fraction of rows held out for evaluation
    pub test_ratio: f64,
    /// Seed for the reproducible train/test shuffle and the forest
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Held-out evaluation for one candidate family
#[derive(Debug, Clone)]
pub struct CandidateReport {
    /// Model name
    pub name: String,
    /// Held-out metrics
    pub metrics: RegressionMetrics,
}

/// Result of a training run
#[derive(Debug)]
pub struct TrainingOutcome {
    /// The persisted bundle: model, encodings and column order
    pub artifact: ModelArtifact,
    /// Evaluation of each candidate on the held-out split
    pub candidates: Vec<CandidateReport>,
    /// Name of the selected candidate
    pub selected: String,
    /// Number of training rows used
    pub rows: usize,
}

/// Train both candidate families on the assembled history and select the
/// one with the higher held-out R².
///
/// The split is an 80/20 shuffle with a fixed seed, so the whole run is
/// reproducible. Selection uses a strict comparison; on an exact tie the
/// random forest wins, deterministically.
pub fn train(records: &[SalesRecord], options: &TrainingOptions) -> Result<TrainingOutcome> {
    if options.test_ratio <= 0.0 || options.test_ratio >= 1.0 {
        return Err(ForecastError::InvalidParameter(
            "Test ratio must be between 0 and 1".to_string(),
        ));
    }

    let rows = training_table(records);

    let product_count = rows
        .iter()
        .map(|row| row.product_id)
        .collect::<BTreeSet<_>>()
        .len();
    if product_count < 2 {
        return Err(ForecastError::TrainingError(format!(
            "Training requires at least 2 well-populated products, found {}",
            product_count
        )));
    }

    let encodings = EncodingTable::from_categories(rows.iter().map(|row| row.category.as_str()));
    let feature_columns: Vec<String> = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();

    let (x, y) = feature_matrix(&rows, &encodings, &feature_columns)?;
    let (train_idx, test_idx) = split_indices(x.len(), options.test_ratio, options.seed);
    if train_idx.is_empty() || test_idx.is_empty() {
        return Err(ForecastError::TrainingError(
            "Not enough rows to form a train/test split".to_string(),
        ));
    }

    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
    let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

    tracing::info!(
        rows = x.len(),
        train = x_train.len(),
        test = x_test.len(),
        products = product_count,
        "fitting candidate models"
    );

    let gb_config = GradientBoosting::default_config();
    let rf_config = RandomForest::default_config(options.seed);

    let gb = gb_config.fit(&x_train, &y_train)?;
    let rf = rf_config.fit(&x_train, &y_train)?;

    let gb_pred: Vec<f64> = x_test.iter().map(|row| gb.predict(row)).collect();
    let rf_pred: Vec<f64> = x_test.iter().map(|row| rf.predict(row)).collect();

    let gb_metrics = evaluate(&y_test, &gb_pred)?;
    let rf_metrics = evaluate(&y_test, &rf_pred)?;

    tracing::info!(gb_r2 = gb_metrics.r2, rf_r2 = rf_metrics.r2, "candidate scores");

    // Strict comparison: a tie selects the forest
    let model = if gb_metrics.r2 > rf_metrics.r2 {
        TrainedRegressor::GradientBoosting(gb)
    } else {
        TrainedRegressor::RandomForest(rf)
    };
    let selected = model.name().to_string();

    tracing::info!(selected = %selected, "model selected");

    let candidates = vec![
        CandidateReport {
            name: gb_config.name().to_string(),
            metrics: gb_metrics,
        },
        CandidateReport {
            name: rf_config.name().to_string(),
            metrics: rf_metrics,
        },
    ];

    Ok(TrainingOutcome {
        artifact: ModelArtifact {
            model,
            encodings,
            feature_columns,
            trained_at: Utc::now(),
        },
        candidates,
        selected,
        rows: x.len(),
    })
}

/// Encode feature rows into an aligned matrix and target vector
fn feature_matrix(
    rows: &[FeatureRow],
    encodings: &EncodingTable,
    columns: &[String],
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let mut x = Vec::with_capacity(rows.len());
    let mut y = Vec::with_capacity(rows.len());
    for row in rows {
        x.push(row.ordered_values(encodings, columns)?);
        y.push(row.quantity_sold);
    }
    Ok((x, y))
}

/// Shuffle row indices with a seeded generator and split them 80/20
fn split_indices(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = (n as f64 * test_ratio).round() as usize;
    let test = indices[..test_size.min(n)].to_vec();
    let train = indices[test_size.min(n)..].to_vec();
    (train, test)
}
