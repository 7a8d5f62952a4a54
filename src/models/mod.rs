//! Candidate regression models for demand prediction
//!
//! Two families compete under the fixed evaluation protocol: gradient
//! boosting and random forest. Downstream code depends only on
//! [`TrainedRegressor`], never on which family won selection.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod gradient_boosting;
pub mod random_forest;
pub mod tree;

pub use gradient_boosting::{GradientBoosting, TrainedGradientBoosting};
pub use random_forest::{RandomForest, TrainedRandomForest};

/// A regression model that can be fitted to a feature matrix
pub trait RegressorModel: Debug + Clone {
    /// The type of trained model produced
    type Trained;

    /// Fit the model to aligned feature rows and targets
    fn fit(&self, x: &[Vec<f64>], y: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// The regressor that won model selection, as a tagged union with a
/// uniform predict contract.
///
/// Serialized inside the model artifact, so the persisted bundle carries
/// which family was chosen without callers having to care.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedRegressor {
    /// Boosted-tree ensemble
    GradientBoosting(TrainedGradientBoosting),
    /// Random-forest ensemble
    RandomForest(TrainedRandomForest),
}

impl TrainedRegressor {
    /// Predict a single feature row
    pub fn predict(&self, row: &[f64]) -> f64 {
        match self {
            TrainedRegressor::GradientBoosting(model) => model.predict(row),
            TrainedRegressor::RandomForest(model) => model.predict(row),
        }
    }

    /// Predict a batch of feature rows
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Name of the selected model
    pub fn name(&self) -> &str {
        match self {
            TrainedRegressor::GradientBoosting(model) => model.name(),
            TrainedRegressor::RandomForest(model) => model.name(),
        }
    }
}
