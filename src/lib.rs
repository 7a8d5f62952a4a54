//! # Pharma Forecast
//!
//! A Rust library for per-product demand forecasting and reorder advisory
//! over pharmacy sales data.
//!
//! ## Features
//!
//! - Dataset assembly (daily sales joined with climate context)
//! - Lag/rolling/growth feature engineering per product
//! - Two candidate regressors (gradient boosting, random forest) selected
//!   by held-out R² under a fixed, seeded evaluation protocol
//! - A persisted model artifact bundling model, encodings and column order
//! - Recursive multi-day forecasting with seasonal weather climatology
//! - Reorder recommendations for the top-volume products
//!
//! ## Quick Start
//!
//! ```no_run
//! use pharma_forecast::data::{assemble, DataLoader};
//! use pharma_forecast::features::training_table;
//! use pharma_forecast::forecast::Forecaster;
//! use pharma_forecast::training::{train, TrainingOptions};
//! use std::sync::Arc;
//!
//! fn main() -> pharma_forecast::Result<()> {
//!     // Load and assemble the datasets
//!     let products = DataLoader::products_from_csv("data/products.csv")?;
//!     let sales = DataLoader::sales_from_csv("data/historical_sales.csv")?;
//!     let climate = DataLoader::climate_from_csv("data/climate.csv")?;
//!     let records = assemble(&sales, &climate);
//!
//!     // Train and persist the model
//!     let outcome = train(&records, &TrainingOptions::default())?;
//!     outcome.artifact.save("data/sales_prediction_model.json")?;
//!
//!     // Forecast 30 days for one product
//!     let rows = training_table(&records);
//!     let forecaster = Forecaster::new(Arc::new(outcome.artifact), &products, &rows, &climate);
//!     let forecast = forecaster.forecast(1, None, 30)?;
//!     println!("total predicted: {}", forecast.summary.total_predicted);
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod config;
pub mod data;
pub mod encoding;
pub mod error;
pub mod features;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod reorder;
pub mod training;

// Re-export commonly used types
pub use crate::artifact::{ArtifactStore, ModelArtifact};
pub use crate::config::ForecastConfig;
pub use crate::data::{
    assemble, ClimateObservation, DataLoader, Product, SalesObservation, SalesRecord, Season,
};
pub use crate::encoding::{EncodingTable, UNSEEN_CATEGORY};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{training_table, FeatureRow, FEATURE_COLUMNS, MIN_PRODUCT_HISTORY};
pub use crate::forecast::{Forecast, ForecastPoint, Forecaster, SeasonalClimatology};
pub use crate::models::TrainedRegressor;
pub use crate::reorder::{recommendations, ReorderOptions, ReorderRecommendation, StockProvider};
pub use crate::training::{train, TrainingOptions, TrainingOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
