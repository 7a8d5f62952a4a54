//! Gradient-boosted regression trees

use crate::error::{ForecastError, Result};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::RegressorModel;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Gradient boosting configuration.
///
/// Boosting fits shallow trees to the residuals of the running prediction;
/// no bootstrap or feature subsampling is involved, so training is fully
/// deterministic for the same inputs.
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    /// Name of the model
    name: String,
    /// Number of boosting rounds
    n_estimators: usize,
    /// Shrinkage applied to each tree's contribution
    learning_rate: f64,
    /// Depth of each base tree
    max_depth: usize,
    /// Minimum samples to split a node
    min_samples_split: usize,
}

/// Trained gradient boosting ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedGradientBoosting {
    /// Name of the model
    name: String,
    /// Initial prediction (mean of training targets)
    base_prediction: f64,
    /// Shrinkage applied to each tree's contribution
    learning_rate: f64,
    /// Fitted residual trees
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    /// Create a new gradient boosting configuration
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize) -> Result<Self> {
        if n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of estimators must be positive".to_string(),
            ));
        }
        if learning_rate <= 0.0 || learning_rate > 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be in (0, 1]".to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "Gradient Boosting (trees={}, lr={}, depth={})",
                n_estimators, learning_rate, max_depth
            ),
            n_estimators,
            learning_rate,
            max_depth,
            min_samples_split: 4,
        })
    }

    /// Default configuration used by the trainer
    pub fn default_config() -> Self {
        Self {
            name: "Gradient Boosting (trees=50, lr=0.1, depth=3)".to_string(),
            n_estimators: 50,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 4,
        }
    }
}

impl RegressorModel for GradientBoosting {
    type Trained = TrainedGradientBoosting;

    fn fit(&self, x: &[Vec<f64>], y: &[f64]) -> Result<TrainedGradientBoosting> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ForecastError::TrainingError(
                "Gradient boosting requires a non-empty, aligned training set".to_string(),
            ));
        }

        let base_prediction = y.iter().sum::<f64>() / y.len() as f64;
        let mut current: Vec<f64> = vec![base_prediction; y.len()];
        let mut trees = Vec::with_capacity(self.n_estimators);

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: None,
        };
        // rng is unused while max_features is None; fixed seed keeps the
        // signature honest
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..self.n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(current.iter())
                .map(|(&target, &pred)| target - pred)
                .collect();

            let tree = RegressionTree::fit(x, &residuals, &params, &mut rng)?;

            for (i, row) in x.iter().enumerate() {
                current[i] += self.learning_rate * tree.predict(row);
            }

            trees.push(tree);
        }

        Ok(TrainedGradientBoosting {
            name: self.name.clone(),
            base_prediction,
            learning_rate: self.learning_rate,
            trees,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedGradientBoosting {
    /// Predict a single row
    pub fn predict(&self, row: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        self.base_prediction + self.learning_rate * boost
    }

    /// Name of the model
    pub fn name(&self) -> &str {
        &self.name
    }
}
