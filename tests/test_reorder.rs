use chrono::{Duration, NaiveDate};
use pharma_forecast::data::{ClimateObservation, Product, SalesObservation, SalesRecord};
use pharma_forecast::error::{ForecastError, Result};
use pharma_forecast::features::training_table;
use pharma_forecast::forecast::Forecaster;
use pharma_forecast::reorder::{
    recommendations, NoLiveStock, ReorderOptions, StaticStock, StockProvider,
    NO_DEMAND_SENTINEL,
};
use pharma_forecast::training::{train, TrainingOptions};
use std::sync::Arc;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

fn sales_for(product_id: u32, category: &str, quantities: &[f64]) -> Vec<SalesObservation> {
    quantities
        .iter()
        .enumerate()
        .map(|(i, &quantity)| {
            SalesObservation::new(
                start_date() + Duration::days(i as i64),
                product_id,
                format!("Product {}", product_id),
                category,
                quantity,
                5.0,
            )
        })
        .collect()
}

fn records_from(sales: &[SalesObservation]) -> Vec<SalesRecord> {
    sales
        .iter()
        .map(|sale| SalesRecord {
            sale: sale.clone(),
            climate: ClimateObservation::new(sale.date, 15.0, 29.0, 22.0, 60.0, 1.5),
        })
        .collect()
}

fn product(id: u32, category: &str) -> Product {
    Product {
        id,
        name: format!("Product {}", id),
        category: category.to_string(),
        price: 5.0,
        barcode: None,
    }
}

/// Forecaster trained on products 1 and 2; products 98 and 99 are in the
/// catalog without training history, so their demand falls back to the
/// history mean
fn fixture() -> Forecaster {
    let mut sales = sales_for(1, "Analgesic", &vec![10.0; 120]);
    sales.extend(sales_for(2, "Antibiotic", &vec![20.0; 120]));
    let records = records_from(&sales);

    let outcome = train(&records, &TrainingOptions::default()).unwrap();
    let rows = training_table(&records);
    let climate: Vec<ClimateObservation> = records.iter().map(|r| r.climate.clone()).collect();

    let products = vec![
        product(1, "Analgesic"),
        product(2, "Antibiotic"),
        product(98, "Supplement"),
        product(99, "Supplement"),
    ];

    Forecaster::new(Arc::new(outcome.artifact), &products, &rows, &climate)
}

struct FailingStock;

impl StockProvider for FailingStock {
    fn current_stock(&self, _product_id: u32) -> Result<Option<u32>> {
        Err(ForecastError::DataError("inventory service down".to_string()))
    }
}

#[test]
fn boundary_at_fourteen_days_is_strict() {
    let forecaster = fixture();
    // 10 observations of 10/day: below the training threshold, so the
    // advisor uses the exact history mean of 10
    let sales = sales_for(99, "Supplement", &vec![10.0; 10]);

    // Exactly 14.0 days of stock: no flag
    let at_boundary = StaticStock::new([(99, 140)]);
    let recs = recommendations(&forecaster, &sales, &at_boundary, &ReorderOptions::default());
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].days_of_stock, 14.0);
    assert!(!recs[0].reorder_flag);
    assert_eq!(recs[0].recommended_order_quantity, 0);

    // Just under: flagged, with the 1.2 safety multiplier applied
    let below_boundary = StaticStock::new([(99, 139)]);
    let recs = recommendations(&forecaster, &sales, &below_boundary, &ReorderOptions::default());
    assert!(recs[0].reorder_flag);
    assert_eq!(recs[0].days_of_stock, 13.9);
    assert_eq!(recs[0].recommended_order_quantity, 360);
}

#[test]
fn zero_demand_yields_the_sentinel_and_no_flag() {
    // Scenario: a product that has never sold
    let forecaster = fixture();
    let sales = sales_for(98, "Supplement", &vec![0.0; 10]);

    let recs = recommendations(&forecaster, &sales, &NoLiveStock, &ReorderOptions::default());
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].days_of_stock, NO_DEMAND_SENTINEL);
    assert!(!recs[0].reorder_flag);
    assert_eq!(recs[0].recommended_order_quantity, 0);
}

#[test]
fn results_sort_most_urgent_first() {
    let forecaster = fixture();
    let mut sales = sales_for(1, "Analgesic", &vec![10.0; 120]);
    sales.extend(sales_for(2, "Antibiotic", &vec![20.0; 120]));

    // Product 2 is nearly out of stock, product 1 has plenty
    let stock = StaticStock::new([(1, 1000), (2, 10)]);
    let recs = recommendations(&forecaster, &sales, &stock, &ReorderOptions::default());

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].product_id, 2);
    assert!(recs[0].reorder_flag);
    assert!(recs[0].recommended_order_quantity > 0);
    assert_eq!(recs[1].product_id, 1);
    assert!(!recs[1].reorder_flag);
    assert_eq!(recs[1].recommended_order_quantity, 0);
}

#[test]
fn failed_stock_lookup_degrades_to_synthesis() {
    let forecaster = fixture();
    let sales = sales_for(99, "Supplement", &vec![10.0; 10]);

    let recs = recommendations(&forecaster, &sales, &FailingStock, &ReorderOptions::default());
    assert_eq!(recs.len(), 1);
    // Synthesized stock is a 10-25x multiple of average daily demand
    assert!(recs[0].days_of_stock >= 9.0 && recs[0].days_of_stock < 25.1);
}

#[test]
fn top_k_bounds_the_candidate_set() {
    let forecaster = fixture();
    let mut sales = sales_for(1, "Analgesic", &vec![10.0; 120]);
    sales.extend(sales_for(2, "Antibiotic", &vec![20.0; 120]));

    let options = ReorderOptions {
        top_k: 1,
        ..ReorderOptions::default()
    };
    let recs = recommendations(&forecaster, &sales, &NoLiveStock, &options);

    // Only the highest-volume product is considered
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].product_id, 2);
}

#[test]
fn synthesized_stock_is_reproducible_for_a_seed() {
    let forecaster = fixture();
    let sales = sales_for(99, "Supplement", &vec![10.0; 10]);

    let options = ReorderOptions::default();
    let a = recommendations(&forecaster, &sales, &NoLiveStock, &options);
    let b = recommendations(&forecaster, &sales, &NoLiveStock, &options);
    assert_eq!(a[0].current_stock, b[0].current_stock);
}
