//! Regression metrics for the fixed evaluation protocol

use crate::error::{ForecastError, Result};

/// Held-out evaluation metrics for a candidate regressor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean Absolute Percentage Error, with +1 denominator smoothing
    pub mape: f64,
}

/// Evaluate predictions against actual values.
///
/// The MAPE denominator uses the same `+1` smoothing as the growth-rate
/// feature, so a zero target never divides by zero and the result stays
/// finite.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<RegressionMetrics> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "Actual and predicted values must have the same non-zero length".to_string(),
        ));
    }

    let n = actual.len() as f64;

    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &p)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot = actual
        .iter()
        .map(|a| (a - mean_actual).powi(2))
        .sum::<f64>();
    let ss_res = errors.iter().map(|e| e.powi(2)).sum::<f64>();
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let mape = actual
        .iter()
        .zip(errors.iter())
        .map(|(&a, &e)| (e.abs() / (a + 1.0)).abs())
        .sum::<f64>()
        / n
        * 100.0;

    Ok(RegressionMetrics { mae, rmse, r2, mape })
}

impl std::fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Regression Metrics:")?;
        writeln!(f, "  MAE:  {:.4}", self.mae)?;
        writeln!(f, "  RMSE: {:.4}", self.rmse)?;
        writeln!(f, "  R2:   {:.4}", self.r2)?;
        writeln!(f, "  MAPE: {:.4}%", self.mape)?;
        Ok(())
    }
}
