//! Regression tree used as the base learner by both ensemble families

use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Growth parameters for a single regression tree
#[derive(Debug, Clone)]
pub struct TreeParams {
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum number of samples required to attempt a split
    pub min_samples_split: usize,
    /// Number of features considered per split; `None` means all
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_samples_split: 4,
            max_features: None,
        }
    }
}

/// Node in the arena-allocated tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted CART-style regression tree.
///
/// Splits minimize the sum of squared errors; leaves predict the mean of
/// their training targets. Nodes live in a flat arena so the tree is cheap
/// to serialize inside the model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit a tree to the given rows.
    ///
    /// `rng` is only consulted when `max_features` restricts the candidate
    /// feature set, so a tree grown without subsampling is fully
    /// deterministic.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ForecastError::TrainingError(
                "Tree fitting requires a non-empty, aligned feature matrix".to_string(),
            ));
        }

        let n_features = x[0].len();
        let indices: Vec<usize> = (0..x.len()).collect();
        let mut nodes = Vec::new();
        build_node(&mut nodes, x, y, &indices, 0, n_features, params, rng);

        Ok(Self { nodes })
    }

    /// Predict a single row
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0usize;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Recursively grow a node, returning its arena index
#[allow(clippy::too_many_arguments)]
fn build_node(
    nodes: &mut Vec<Node>,
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    depth: usize,
    n_features: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> usize {
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

    if depth >= params.max_depth || indices.len() < params.min_samples_split {
        nodes.push(Node::Leaf { value: mean });
        return nodes.len() - 1;
    }

    let features = candidate_features(n_features, params.max_features, rng);
    let split = best_split(x, y, indices, &features);

    let (feature, threshold) = match split {
        Some(s) => s,
        None => {
            nodes.push(Node::Leaf { value: mean });
            return nodes.len() - 1;
        }
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[i][feature] <= threshold);

    // Reserve the split slot before growing children so child indices are known
    nodes.push(Node::Leaf { value: mean });
    let index = nodes.len() - 1;

    let left = build_node(nodes, x, y, &left_indices, depth + 1, n_features, params, rng);
    let right = build_node(nodes, x, y, &right_indices, depth + 1, n_features, params, rng);

    nodes[index] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    index
}

/// Feature indices to consider at a split
fn candidate_features(n_features: usize, max_features: Option<usize>, rng: &mut StdRng) -> Vec<usize> {
    let mut features: Vec<usize> = (0..n_features).collect();
    if let Some(m) = max_features {
        if m < n_features {
            features.shuffle(rng);
            features.truncate(m.max(1));
            features.sort_unstable();
        }
    }
    features
}

/// Find the (feature, threshold) pair with the largest SSE reduction.
///
/// Returns `None` when no candidate feature separates the targets, in which
/// case the caller emits a leaf.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    features: &[usize],
) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let base_sse = total_sq - total_sum * total_sum / n;

    if base_sse <= 1e-12 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    let mut best_reduction = 1e-12;

    for &feature in features {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (x[i][feature], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 1..pairs.len() {
            left_sum += pairs[i - 1].1;
            left_sq += pairs[i - 1].1 * pairs[i - 1].1;

            // Only split between distinct feature values
            if pairs[i].0 <= pairs[i - 1].0 {
                continue;
            }

            let n_left = i as f64;
            let n_right = n - n_left;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let sse_left = left_sq - left_sum * left_sum / n_left;
            let sse_right = right_sq - right_sum * right_sum / n_right;
            let reduction = base_sse - (sse_left + sse_right);

            if reduction > best_reduction {
                best_reduction = reduction;
                best = Some((feature, (pairs[i - 1].0 + pairs[i].0) / 2.0));
            }
        }
    }

    best
}
