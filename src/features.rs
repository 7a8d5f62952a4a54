//! Feature engineering: lag, rolling and growth features per product

use crate::data::{SalesRecord, Season};
use crate::encoding::EncodingTable;
use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, Weekday};
use std::collections::BTreeMap;

/// Minimum number of historical observations a product needs to take part
/// in training. Below this there is too little signal for the 30-day lag.
pub const MIN_PRODUCT_HISTORY: usize = 60;

/// Lag offsets, in sequence positions within a product's own history
pub const LAG_OFFSETS: [usize; 3] = [7, 14, 30];

/// Rolling-average window sizes
pub const ROLLING_WINDOWS: [usize; 3] = [7, 14, 30];

/// Canonical feature-column order used at training time.
///
/// Inference must present features to the model in this exact order, which
/// is why the list travels inside the persisted artifact.
pub const FEATURE_COLUMNS: [&str; 16] = [
    "month",
    "calendar_week",
    "temp_avg",
    "humidity",
    "rainfall",
    "lag_7",
    "lag_14",
    "lag_30",
    "rolling_avg_7",
    "rolling_avg_14",
    "rolling_avg_30",
    "growth_rate_7",
    "season_code",
    "weekday_code",
    "category_code",
    "is_weekend_code",
];

/// One supervised-learning row, keyed by (product_id, date), with the
/// known target attached
#[derive(Debug, Clone)]
pub struct FeatureRow {
    /// Product id
    pub product_id: u32,
    /// Product name
    pub product_name: String,
    /// Observation date
    pub date: NaiveDate,
    /// Calendar month (1-12)
    pub month: u32,
    /// ISO calendar week
    pub calendar_week: u32,
    /// Average temperature on the date
    pub temp_avg: f64,
    /// Humidity on the date
    pub humidity: f64,
    /// Rainfall on the date
    pub rainfall: f64,
    /// Quantity sold 7 observations earlier
    pub lag_7: f64,
    /// Quantity sold 14 observations earlier
    pub lag_14: f64,
    /// Quantity sold 30 observations earlier
    pub lag_30: f64,
    /// Mean of the trailing 7 observations (minimum window 1)
    pub rolling_avg_7: f64,
    /// Mean of the trailing 14 observations (minimum window 1)
    pub rolling_avg_14: f64,
    /// Mean of the trailing 30 observations (minimum window 1)
    pub rolling_avg_30: f64,
    /// (quantity - lag_7) / (lag_7 + 1)
    pub growth_rate_7: f64,
    /// Season of the date
    pub season: Season,
    /// Day of week
    pub weekday: Weekday,
    /// Product category
    pub category: String,
    /// Whether the date falls on a weekend
    pub is_weekend: bool,
    /// Target: units sold on the date
    pub quantity_sold: f64,
}

impl FeatureRow {
    /// Numeric feature vector in a caller-supplied column order, with the
    /// categorical fields encoded through `table`.
    ///
    /// At inference the column list comes from the artifact, so train and
    /// inference always agree on ordering.
    pub fn ordered_values(&self, table: &EncodingTable, columns: &[String]) -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(columns.len());
        for column in columns {
            let value = match column.as_str() {
                "month" => self.month as f64,
                "calendar_week" => self.calendar_week as f64,
                "temp_avg" => self.temp_avg,
                "humidity" => self.humidity,
                "rainfall" => self.rainfall,
                "lag_7" => self.lag_7,
                "lag_14" => self.lag_14,
                "lag_30" => self.lag_30,
                "rolling_avg_7" => self.rolling_avg_7,
                "rolling_avg_14" => self.rolling_avg_14,
                "rolling_avg_30" => self.rolling_avg_30,
                "growth_rate_7" => self.growth_rate_7,
                "season_code" => table.encode_season(self.season) as f64,
                "weekday_code" => table.encode_weekday(self.weekday) as f64,
                "category_code" => table.encode_category(&self.category) as f64,
                "is_weekend_code" => {
                    if self.is_weekend {
                        1.0
                    } else {
                        0.0
                    }
                }
                other => {
                    return Err(ForecastError::ValidationError(format!(
                        "Unknown feature column: {}",
                        other
                    )))
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}

/// Derive one feature row per qualifying date from a single product's
/// chronological history.
///
/// Lag features look back exactly 7/14/30 positions in the product's own
/// sequence; a row is dropped when any lag is undefined. Rolling averages
/// use a minimum window of 1 and include the current observation, matching
/// the training-set convention. Pure transform; inputs are not mutated.
pub fn product_features(records: &[&SalesRecord]) -> Vec<FeatureRow> {
    let mut ordered: Vec<&SalesRecord> = records.to_vec();
    ordered.sort_by_key(|r| r.sale.date);

    let quantities: Vec<f64> = ordered.iter().map(|r| r.sale.quantity_sold).collect();

    let mut rows = Vec::new();
    for (i, record) in ordered.iter().enumerate() {
        // lag_30 undefined implies insufficient history; drop the row
        let max_lag = LAG_OFFSETS[LAG_OFFSETS.len() - 1];
        if i < max_lag {
            continue;
        }

        let lag_7 = quantities[i - 7];
        let lag_14 = quantities[i - 14];
        let lag_30 = quantities[i - 30];

        let sale = &record.sale;
        rows.push(FeatureRow {
            product_id: sale.product_id,
            product_name: sale.product_name.clone(),
            date: sale.date,
            month: sale.month,
            calendar_week: sale.calendar_week,
            temp_avg: record.climate.temp_avg,
            humidity: record.climate.humidity,
            rainfall: record.climate.rainfall,
            lag_7,
            lag_14,
            lag_30,
            rolling_avg_7: trailing_mean(&quantities, i, 7),
            rolling_avg_14: trailing_mean(&quantities, i, 14),
            rolling_avg_30: trailing_mean(&quantities, i, 30),
            growth_rate_7: (sale.quantity_sold - lag_7) / (lag_7 + 1.0),
            season: sale.season,
            weekday: sale.weekday,
            category: sale.category.clone(),
            is_weekend: sale.is_weekend,
            quantity_sold: sale.quantity_sold,
        });
    }

    rows
}

/// Mean of up to `window` trailing values ending at (and including) index `i`
fn trailing_mean(values: &[f64], i: usize, window: usize) -> f64 {
    let start = (i + 1).saturating_sub(window);
    let slice = &values[start..=i];
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Build the full training table: per-product feature rows for every product
/// with at least [`MIN_PRODUCT_HISTORY`] observations.
///
/// Products below the threshold are excluded entirely. Output is grouped by
/// product id ascending and chronological within each product, which keeps
/// the result deterministic for identical inputs.
pub fn training_table(records: &[SalesRecord]) -> Vec<FeatureRow> {
    let mut by_product: BTreeMap<u32, Vec<&SalesRecord>> = BTreeMap::new();
    for record in records {
        by_product
            .entry(record.sale.product_id)
            .or_default()
            .push(record);
    }

    let mut rows = Vec::new();
    let mut excluded = 0usize;
    for (_, product_records) in by_product {
        if product_records.len() < MIN_PRODUCT_HISTORY {
            excluded += 1;
            continue;
        }
        rows.extend(product_features(&product_records));
    }

    if excluded > 0 {
        tracing::debug!(excluded, "products below history threshold excluded");
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_mean_partial_window() {
        let values = [2.0, 4.0, 6.0];
        assert_eq!(trailing_mean(&values, 0, 7), 2.0);
        assert_eq!(trailing_mean(&values, 2, 2), 5.0);
        assert_eq!(trailing_mean(&values, 2, 7), 4.0);
    }
}
