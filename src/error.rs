//! Error types for the pharma_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the pharma_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Product id is not present in the catalog
    #[error("Product {0} not found in catalog")]
    ProductNotFound(u32),

    /// Product exists but has no usable history, so no forecast can be made
    #[error("No recorded history for product {0}")]
    NoHistory(u32),

    /// Error related to model training
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from (de)serializing a model artifact or config
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
