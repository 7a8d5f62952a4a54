//! Runtime configuration: dataset locations and policy defaults

use crate::error::Result;
use crate::forecast::DEFAULT_HORIZON;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for a forecasting run.
///
/// All fields have sensible defaults, so a JSON config file only needs to
/// override what differs from the standard layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Product catalog CSV
    pub catalog_path: PathBuf,
    /// Historical sales CSV
    pub sales_path: PathBuf,
    /// Climate observations CSV
    pub climate_path: PathBuf,
    /// Where the trained model artifact lives
    pub artifact_path: PathBuf,
    /// Seed for the train/test shuffle and synthesized stock
    pub seed: u64,
    /// Forecast horizon in days
    pub horizon: usize,
    /// Number of top-volume products considered for reorder advice
    pub top_k: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/products.csv"),
            sales_path: PathBuf::from("data/historical_sales.csv"),
            climate_path: PathBuf::from("data/climate.csv"),
            artifact_path: PathBuf::from("data/sales_prediction_model.json"),
            seed: 42,
            horizon: DEFAULT_HORIZON,
            top_k: 20,
        }
    }
}

impl ForecastConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}
