//! Random forest regression

use crate::error::{ForecastError, Result};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::RegressorModel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random forest configuration.
///
/// Each tree is grown on a bootstrap sample with a random feature subset
/// per split; the per-tree generators are seeded from `seed`, so training
/// is reproducible for the same inputs.
#[derive(Debug, Clone)]
pub struct RandomForest {
    /// Name of the model
    name: String,
    /// Number of trees in the forest
    n_estimators: usize,
    /// Depth of each tree
    max_depth: usize,
    /// Minimum samples to split a node
    min_samples_split: usize,
    /// Base seed for bootstrap and feature sampling
    seed: u64,
}

/// Trained random forest ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedRandomForest {
    /// Name of the model
    name: String,
    /// Fitted trees
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Create a new random forest configuration
    pub fn new(n_estimators: usize, max_depth: usize, seed: u64) -> Result<Self> {
        if n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of estimators must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Random Forest (trees={}, depth={})", n_estimators, max_depth),
            n_estimators,
            max_depth,
            min_samples_split: 4,
            seed,
        })
    }

    /// Default configuration used by the trainer
    pub fn default_config(seed: u64) -> Self {
        Self {
            name: "Random Forest (trees=50, depth=10)".to_string(),
            n_estimators: 50,
            max_depth: 10,
            min_samples_split: 4,
            seed,
        }
    }
}

impl RegressorModel for RandomForest {
    type Trained = TrainedRandomForest;

    fn fit(&self, x: &[Vec<f64>], y: &[f64]) -> Result<TrainedRandomForest> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ForecastError::TrainingError(
                "Random forest requires a non-empty, aligned training set".to_string(),
            ));
        }

        let n = x.len();
        let n_features = x[0].len();
        // The usual regression heuristic: a third of the features per split
        let max_features = (n_features / 3).max(1);

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: Some(max_features),
        };

        let mut trees = Vec::with_capacity(self.n_estimators);
        for t in 0..self.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(t as u64));

            let mut boot_x = Vec::with_capacity(n);
            let mut boot_y = Vec::with_capacity(n);
            for _ in 0..n {
                let i = rng.gen_range(0..n);
                boot_x.push(x[i].clone());
                boot_y.push(y[i]);
            }

            trees.push(RegressionTree::fit(&boot_x, &boot_y, &params, &mut rng)?);
        }

        Ok(TrainedRandomForest {
            name: self.name.clone(),
            trees,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedRandomForest {
    /// Predict a single row as the mean of the tree predictions
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    /// Name of the model
    pub fn name(&self) -> &str {
        &self.name
    }
}
