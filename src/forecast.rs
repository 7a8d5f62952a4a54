//! Recursive multi-day demand forecasting per product

use crate::artifact::ModelArtifact;
use crate::data::{weekday_name, ClimateObservation, Product, Season};
use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Default forecast horizon, in days
pub const DEFAULT_HORIZON: usize = 30;

/// Number of trailing history observations captured as the recent window
pub const RECENT_WINDOW: usize = 30;

/// One forecasted day
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    /// Forecast date
    pub date: NaiveDate,
    /// Full weekday name
    pub day: String,
    /// Season of the date
    pub season: Season,
    /// Predicted units sold; floored at zero, truncated to an integer
    pub predicted_quantity: u32,
}

/// Summary totals over a forecast horizon
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    /// Sum of predicted quantities over the horizon
    pub total_predicted: u32,
    /// Average predicted quantity per day, to one decimal place
    pub avg_daily: f64,
}

/// Ordered forecast for one product, as consumed by the API layer
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    /// Product id
    pub product_id: u32,
    /// Product name
    pub product_name: String,
    /// One point per day of the horizon, in chronological order
    pub points: Vec<ForecastPoint>,
    /// Summary totals
    pub summary: ForecastSummary,
}

/// Per-season historical weather averages, used as a proxy for unknown
/// future weather
#[derive(Debug, Clone, Default)]
pub struct SeasonalAverages {
    /// Mean temperature
    pub temp_avg: f64,
    /// Mean humidity
    pub humidity: f64,
    /// Mean rainfall
    pub rainfall: f64,
}

/// Seasonal climatology over the full climate history
#[derive(Debug, Clone)]
pub struct SeasonalClimatology {
    by_season: HashMap<Season, SeasonalAverages>,
}

impl SeasonalClimatology {
    /// Average temperature, humidity and rainfall across all observations
    /// tagged with each season
    pub fn from_climate(climate: &[ClimateObservation]) -> Self {
        let mut sums: HashMap<Season, (f64, f64, f64, usize)> = HashMap::new();
        for obs in climate {
            let entry = sums.entry(obs.season).or_insert((0.0, 0.0, 0.0, 0));
            entry.0 += obs.temp_avg;
            entry.1 += obs.humidity;
            entry.2 += obs.rainfall;
            entry.3 += 1;
        }

        let by_season = sums
            .into_iter()
            .map(|(season, (temp, humidity, rainfall, count))| {
                let n = count as f64;
                (
                    season,
                    SeasonalAverages {
                        temp_avg: temp / n,
                        humidity: humidity / n,
                        rainfall: rainfall / n,
                    },
                )
            })
            .collect();

        Self { by_season }
    }

    /// Climatology for a season; zeros when the season never appears in
    /// the climate history
    pub fn lookup(&self, season: Season) -> SeasonalAverages {
        self.by_season.get(&season).cloned().unwrap_or_default()
    }
}

/// Frozen lag/rolling profile derived from the recent window
#[derive(Debug, Clone, Copy)]
struct WindowProfile {
    lag_7: f64,
    lag_14: f64,
    lag_30: f64,
    rolling_avg_7: f64,
    rolling_avg_14: f64,
    rolling_avg_30: f64,
}

/// Lag and rolling features from the recent window, as tail means.
///
/// The profile is captured once per forecast call and reused for every day
/// of the horizon; predictions do not feed back into it. That frozen-window
/// behavior is a deliberate compatibility choice — a rolling-forward
/// variant (each day's prediction appended to the window) only needs to
/// replace this function and re-derive the profile per day.
fn window_profile(window: &[f64]) -> WindowProfile {
    WindowProfile {
        lag_7: tail_mean(window, 7),
        lag_14: tail_mean(window, 14),
        lag_30: tail_mean(window, 30),
        rolling_avg_7: tail_mean(window, 7),
        rolling_avg_14: tail_mean(window, 14),
        rolling_avg_30: tail_mean(window, 30),
    }
}

/// Mean of the last `n` values (all of them when fewer are available)
fn tail_mean(values: &[f64], n: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let tail = &values[values.len().saturating_sub(n)..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Forecast engine over a loaded artifact and per-product recent history.
///
/// Read-only after construction; a single instance can serve concurrent
/// forecast calls.
#[derive(Debug)]
pub struct Forecaster {
    artifact: Arc<ModelArtifact>,
    catalog: HashMap<u32, Product>,
    history: HashMap<u32, Vec<f64>>,
    climatology: SeasonalClimatology,
}

impl Forecaster {
    /// Build a forecaster from the artifact, the product catalog, the
    /// materialized training rows (per-product chronological history) and
    /// the climate table
    pub fn new(
        artifact: Arc<ModelArtifact>,
        products: &[Product],
        training_rows: &[FeatureRow],
        climate: &[ClimateObservation],
    ) -> Self {
        let catalog = products.iter().map(|p| (p.id, p.clone())).collect();

        let mut history: HashMap<u32, Vec<f64>> = HashMap::new();
        for row in training_rows {
            history
                .entry(row.product_id)
                .or_default()
                .push(row.quantity_sold);
        }

        Self {
            artifact,
            catalog,
            history,
            climatology: SeasonalClimatology::from_climate(climate),
        }
    }

    /// Produce an N-day forecast for one product.
    ///
    /// `start` defaults to the current date. The call is a pure function of
    /// its inputs: the same arguments against the same artifact and history
    /// produce the same sequence.
    pub fn forecast(
        &self,
        product_id: u32,
        start: Option<NaiveDate>,
        horizon: usize,
    ) -> Result<Forecast> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be positive".to_string(),
            ));
        }

        let product = self
            .catalog
            .get(&product_id)
            .ok_or(ForecastError::ProductNotFound(product_id))?;

        let history = self
            .history
            .get(&product_id)
            .filter(|h| !h.is_empty())
            .ok_or(ForecastError::NoHistory(product_id))?;

        let start = start.unwrap_or_else(|| Utc::now().date_naive());

        // Step 0: capture the recent window once for the whole horizon
        let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
        let profile = window_profile(window);

        let mut points = Vec::with_capacity(horizon);
        let mut total: u32 = 0;

        for offset in 0..horizon {
            let date = start + Duration::days(offset as i64);
            let season = Season::for_month(date.month());
            let weather = self.climatology.lookup(season);
            let weekday = date.weekday();

            let row = FeatureRow {
                product_id,
                product_name: product.name.clone(),
                date,
                month: date.month(),
                calendar_week: date.iso_week().week(),
                temp_avg: weather.temp_avg,
                humidity: weather.humidity,
                rainfall: weather.rainfall,
                lag_7: profile.lag_7,
                lag_14: profile.lag_14,
                lag_30: profile.lag_30,
                rolling_avg_7: profile.rolling_avg_7,
                rolling_avg_14: profile.rolling_avg_14,
                rolling_avg_30: profile.rolling_avg_30,
                // No growth signal is available going forward
                growth_rate_7: 0.0,
                season,
                weekday,
                category: product.category.clone(),
                is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
                quantity_sold: 0.0,
            };

            let values = row.ordered_values(&self.artifact.encodings, &self.artifact.feature_columns)?;
            let raw = self.artifact.model.predict(&values);
            let predicted = raw.max(0.0).trunc() as u32;
            total += predicted;

            points.push(ForecastPoint {
                date,
                day: weekday_name(weekday).to_string(),
                season,
                predicted_quantity: predicted,
            });
        }

        let avg_daily = (total as f64 / horizon as f64 * 10.0).round() / 10.0;

        Ok(Forecast {
            product_id,
            product_name: product.name.clone(),
            points,
            summary: ForecastSummary {
                total_predicted: total,
                avg_daily,
            },
        })
    }

    /// Whether the catalog knows this product
    pub fn knows_product(&self, product_id: u32) -> bool {
        self.catalog.contains_key(&product_id)
    }

    /// Chronological training-set history for a product, if any
    pub fn product_history(&self, product_id: u32) -> Option<&[f64]> {
        self.history.get(&product_id).map(Vec::as_slice)
    }
}

/// One entry of the seasonal top-N demand ranking
#[derive(Debug, Clone, Serialize)]
pub struct SeasonalDemand {
    /// Product id
    pub product_id: u32,
    /// Product name
    pub product_name: String,
    /// Product category
    pub category: String,
    /// Mean quantity sold within the season
    pub mean_quantity: f64,
    /// Mean quantity scaled to a 30-day month
    pub estimated_monthly_demand: u32,
}

/// Rank products by mean quantity sold within a season.
///
/// Operates on the materialized training rows; the top `top_n` products are
/// returned in descending demand order, ties broken by product id so the
/// ranking is deterministic.
pub fn seasonal_demand(rows: &[FeatureRow], season: Season, top_n: usize) -> Vec<SeasonalDemand> {
    let mut grouped: BTreeMap<u32, (String, String, f64, usize)> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.season == season) {
        let entry = grouped.entry(row.product_id).or_insert_with(|| {
            (row.product_name.clone(), row.category.clone(), 0.0, 0)
        });
        entry.2 += row.quantity_sold;
        entry.3 += 1;
    }

    let mut ranking: Vec<SeasonalDemand> = grouped
        .into_iter()
        .map(|(product_id, (product_name, category, sum, count))| {
            let mean_quantity = sum / count as f64;
            SeasonalDemand {
                product_id,
                product_name,
                category,
                mean_quantity,
                estimated_monthly_demand: (mean_quantity * 30.0).trunc() as u32,
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.mean_quantity
            .total_cmp(&a.mean_quantity)
            .then(a.product_id.cmp(&b.product_id))
    });
    ranking.truncate(top_n);
    ranking
}
