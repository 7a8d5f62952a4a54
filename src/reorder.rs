//! Reorder recommendations driven by forecasted demand

use crate::data::SalesObservation;
use crate::error::{ForecastError, Result};
use crate::forecast::{Forecaster, DEFAULT_HORIZON};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;

/// Reorder is flagged when days of stock fall strictly below this
pub const REORDER_THRESHOLD_DAYS: f64 = 14.0;

/// Safety multiplier applied to the horizon demand when ordering
pub const SAFETY_MULTIPLIER: f64 = 1.2;

/// Days-of-stock sentinel for products with no demand at all
pub const NO_DEMAND_SENTINEL: f64 = 999.0;

/// Source of live inventory levels.
///
/// Implementations own their transport concerns (including any timeout);
/// the advisor treats an `Err` as a degraded lookup and falls back to a
/// synthesized estimate instead of failing the batch.
pub trait StockProvider {
    /// Current stock for a product; `Ok(None)` when the product is not
    /// tracked by live inventory
    fn current_stock(&self, product_id: u32) -> Result<Option<u32>>;
}

/// Stock provider with no live inventory; every lookup synthesizes.
/// Demo/test path only.
#[derive(Debug, Default)]
pub struct NoLiveStock;

impl StockProvider for NoLiveStock {
    fn current_stock(&self, _product_id: u32) -> Result<Option<u32>> {
        Ok(None)
    }
}

/// In-memory stock table, useful for tests and batch runs
#[derive(Debug, Default)]
pub struct StaticStock {
    levels: HashMap<u32, u32>,
}

impl StaticStock {
    /// Build from (product id, stock) pairs
    pub fn new<I: IntoIterator<Item = (u32, u32)>>(levels: I) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }
}

impl StockProvider for StaticStock {
    fn current_stock(&self, product_id: u32) -> Result<Option<u32>> {
        Ok(self.levels.get(&product_id).copied())
    }
}

/// Options controlling a recommendation batch
#[derive(Debug, Clone)]
pub struct ReorderOptions {
    /// Number of top-volume products to consider
    pub top_k: usize,
    /// Forecast horizon used for the demand total
    pub horizon: usize,
    /// Seed for the synthesized-stock fallback
    pub seed: u64,
}

impl Default for ReorderOptions {
    fn default() -> Self {
        Self {
            top_k: 20,
            horizon: DEFAULT_HORIZON,
            seed: 42,
        }
    }
}

/// Reorder advice for one product
#[derive(Debug, Clone, Serialize)]
pub struct ReorderRecommendation {
    /// Product id
    pub product_id: u32,
    /// Product name
    pub product_name: String,
    /// Current stock on hand (live or synthesized)
    pub current_stock: u32,
    /// Average predicted daily sales
    pub avg_daily_sales: f64,
    /// Total predicted demand over the horizon
    pub predicted_30_day_total: u32,
    /// Stock on hand divided by average daily demand; 999 when there is
    /// no demand
    pub days_of_stock: f64,
    /// Whether a reorder is recommended
    pub reorder_flag: bool,
    /// Recommended order quantity; zero when not flagged
    pub recommended_order_quantity: u32,
}

/// Produce reorder recommendations for the top-K products by total
/// historical volume.
///
/// Per candidate: forecast-driven average daily demand and horizon total,
/// falling back to the simple history mean when the product has no usable
/// training history. Stock comes from the provider; a failed or missing
/// lookup logs the degradation and synthesizes a level from average demand.
/// Results are sorted by days of stock ascending, most urgent first.
pub fn recommendations(
    forecaster: &Forecaster,
    sales: &[SalesObservation],
    stock: &dyn StockProvider,
    options: &ReorderOptions,
) -> Vec<ReorderRecommendation> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut results = Vec::new();

    for product_id in top_by_volume(sales, options.top_k) {
        let (avg_daily, horizon_total) =
            match demand_estimate(forecaster, sales, product_id, options.horizon) {
                Some(estimate) => estimate,
                None => continue,
            };

        let current_stock = match stock.current_stock(product_id) {
            Ok(Some(level)) => level,
            Ok(None) => synthesize_stock(avg_daily, &mut rng),
            Err(err) => {
                tracing::warn!(
                    product_id,
                    error = %err,
                    "live stock lookup failed, using synthesized estimate"
                );
                synthesize_stock(avg_daily, &mut rng)
            }
        };

        let days_of_stock = if avg_daily > 0.0 {
            current_stock as f64 / avg_daily
        } else {
            NO_DEMAND_SENTINEL
        };

        let reorder_flag = days_of_stock < REORDER_THRESHOLD_DAYS;
        let recommended_order_quantity = if reorder_flag {
            (horizon_total as f64 * SAFETY_MULTIPLIER).ceil() as u32
        } else {
            0
        };

        results.push(ReorderRecommendation {
            product_id,
            product_name: product_name(sales, product_id),
            current_stock,
            avg_daily_sales: (avg_daily * 10.0).round() / 10.0,
            predicted_30_day_total: horizon_total,
            days_of_stock: (days_of_stock * 10.0).round() / 10.0,
            reorder_flag,
            recommended_order_quantity,
        });
    }

    results.sort_by(|a, b| a.days_of_stock.total_cmp(&b.days_of_stock));
    results
}

/// Forecast-driven demand estimate, with the history-mean fallback.
///
/// Returns `None` for products the catalog does not know, which are
/// skipped rather than failing the batch.
fn demand_estimate(
    forecaster: &Forecaster,
    sales: &[SalesObservation],
    product_id: u32,
    horizon: usize,
) -> Option<(f64, u32)> {
    match forecaster.forecast(product_id, None, horizon) {
        Ok(forecast) => Some((
            forecast.summary.total_predicted as f64 / horizon as f64,
            forecast.summary.total_predicted,
        )),
        Err(ForecastError::NoHistory(_)) => {
            let quantities: Vec<f64> = sales
                .iter()
                .filter(|s| s.product_id == product_id)
                .map(|s| s.quantity_sold)
                .collect();
            let avg = if quantities.is_empty() {
                0.0
            } else {
                quantities.iter().sum::<f64>() / quantities.len() as f64
            };
            Some((avg, (avg * horizon as f64).trunc() as u32))
        }
        Err(_) => None,
    }
}

/// Synthesized stock level: a random multiple (10-25x) of average daily
/// demand. Fallback/test path only, never a substitute for live inventory.
fn synthesize_stock(avg_daily: f64, rng: &mut StdRng) -> u32 {
    (avg_daily * rng.gen_range(10.0..25.0)) as u32
}

/// Product ids ranked by total historical volume, highest first, bounded
/// to `top_k`. Ties break by product id for determinism.
fn top_by_volume(sales: &[SalesObservation], top_k: usize) -> Vec<u32> {
    let mut volume: HashMap<u32, f64> = HashMap::new();
    for sale in sales {
        *volume.entry(sale.product_id).or_insert(0.0) += sale.quantity_sold;
    }

    let mut ranked: Vec<(u32, f64)> = volume.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(top_k);
    ranked.into_iter().map(|(id, _)| id).collect()
}

fn product_name(sales: &[SalesObservation], product_id: u32) -> String {
    sales
        .iter()
        .find(|s| s.product_id == product_id)
        .map(|s| s.product_name.clone())
        .unwrap_or_default()
}
