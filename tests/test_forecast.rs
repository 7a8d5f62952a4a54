use chrono::{Duration, NaiveDate};
use pharma_forecast::data::{ClimateObservation, Product, SalesObservation, SalesRecord, Season};
use pharma_forecast::error::ForecastError;
use pharma_forecast::features::training_table;
use pharma_forecast::forecast::{seasonal_demand, Forecaster, SeasonalClimatology};
use pharma_forecast::training::{train, TrainingOptions};
use std::sync::Arc;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

fn records_for(product_id: u32, category: &str, quantities: &[f64]) -> Vec<SalesRecord> {
    quantities
        .iter()
        .enumerate()
        .map(|(i, &quantity)| {
            let date = start_date() + Duration::days(i as i64);
            SalesRecord {
                sale: SalesObservation::new(
                    date,
                    product_id,
                    format!("Product {}", product_id),
                    category,
                    quantity,
                    5.0,
                ),
                climate: ClimateObservation::new(date, 15.0, 29.0, 22.0, 60.0, 1.5),
            }
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

/// Train on two constant-demand products and build a forecaster that also
/// knows product 99 (in the catalog, no history)
fn fixture() -> (Forecaster, Vec<SalesRecord>) {
    let mut records = records_for(1, "Analgesic", &vec![10.0; 120]);
    records.extend(records_for(2, "Antibiotic", &vec![20.0; 120]));

    let outcome = train(&records, &TrainingOptions::default()).unwrap();
    let rows = training_table(&records);
    let climate: Vec<ClimateObservation> = records.iter().map(|r| r.climate.clone()).collect();

    let products = vec![
        product(1, "Analgesic"),
        product(2, "Antibiotic"),
        product(99, "Supplement"),
    ];

    let forecaster = Forecaster::new(Arc::new(outcome.artifact), &products, &rows, &climate);
    (forecaster, records)
}

#[test]
fn constant_demand_forecast_tracks_history() {
    // Scenario: 30 days for a product with constant demand of 10/day
    let (forecaster, _) = fixture();
    let start = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
    let forecast = forecaster.forecast(1, Some(start), 30).unwrap();

    assert_eq!(forecast.points.len(), 30);
    for point in &forecast.points {
        assert!(
            point.predicted_quantity >= 8 && point.predicted_quantity <= 12,
            "prediction {} outside the expected band",
            point.predicted_quantity
        );
    }

    // The frozen recent window makes every day's input identical, so every
    // prediction within a season is identical too
    let first = forecast.points[0].predicted_quantity;
    let may_points: Vec<_> = forecast
        .points
        .iter()
        .filter(|p| p.season == Season::Summer)
        .collect();
    assert!(may_points.iter().all(|p| p.predicted_quantity == first));

    let total: u32 = forecast.points.iter().map(|p| p.predicted_quantity).sum();
    assert_eq!(forecast.summary.total_predicted, total);
}

#[test]
fn forecast_is_a_pure_function_of_its_inputs() {
    let (forecaster, _) = fixture();
    let start = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();

    let a = forecaster.forecast(1, Some(start), 30).unwrap();
    let b = forecaster.forecast(1, Some(start), 30).unwrap();

    let qa: Vec<u32> = a.points.iter().map(|p| p.predicted_quantity).collect();
    let qb: Vec<u32> = b.points.iter().map(|p| p.predicted_quantity).collect();
    assert_eq!(qa, qb);
}

#[test]
fn points_are_chronological_with_calendar_fields() {
    let (forecaster, _) = fixture();
    let start = NaiveDate::from_ymd_opt(2023, 2, 25).unwrap();
    let forecast = forecaster.forecast(2, Some(start), 10).unwrap();

    for (offset, point) in forecast.points.iter().enumerate() {
        assert_eq!(point.date, start + Duration::days(offset as i64));
    }
    // 2023-02-25 is a Saturday in Winter; 2023-03-01 flips to Summer
    assert_eq!(forecast.points[0].day, "Saturday");
    assert_eq!(forecast.points[0].season, Season::Winter);
    assert_eq!(forecast.points[4].season, Season::Summer);
}

#[test]
fn unknown_product_is_not_found() {
    let (forecaster, _) = fixture();
    let result = forecaster.forecast(777, None, 30);
    assert!(matches!(result, Err(ForecastError::ProductNotFound(777))));
}

#[test]
fn known_product_without_history_is_no_data() {
    let (forecaster, _) = fixture();
    assert!(forecaster.knows_product(99));

    let result = forecaster.forecast(99, None, 30);
    assert!(matches!(result, Err(ForecastError::NoHistory(99))));
}

#[test]
fn zero_horizon_is_rejected() {
    let (forecaster, _) = fixture();
    assert!(forecaster.forecast(1, None, 0).is_err());
}

#[test]
fn climatology_averages_by_season() {
    let winter = ClimateObservation::new(
        NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
        10.0,
        20.0,
        15.0,
        50.0,
        0.0,
    );
    let monsoon_a = ClimateObservation::new(
        NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
        24.0,
        32.0,
        28.0,
        90.0,
        30.0,
    );
    let monsoon_b = ClimateObservation::new(
        NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
        24.0,
        32.0,
        26.0,
        80.0,
        10.0,
    );

    let climatology = SeasonalClimatology::from_climate(&[winter, monsoon_a, monsoon_b]);
    let monsoon = climatology.lookup(Season::Monsoon);
    assert_eq!(monsoon.temp_avg, 27.0);
    assert_eq!(monsoon.humidity, 85.0);
    assert_eq!(monsoon.rainfall, 20.0);

    // A season with no observations falls back to zeros
    let spring = climatology.lookup(Season::Spring);
    assert_eq!(spring.temp_avg, 0.0);
}

#[test]
fn seasonal_demand_ranks_by_mean_quantity() {
    let (_, records) = fixture();
    let rows = training_table(&records);

    let ranking = seasonal_demand(&rows, Season::Winter, 10);
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].product_id, 2);
    assert_eq!(ranking[0].mean_quantity, 20.0);
    assert_eq!(ranking[0].estimated_monthly_demand, 600);
    assert_eq!(ranking[1].product_id, 1);

    let top_one = seasonal_demand(&rows, Season::Winter, 1);
    assert_eq!(top_one.len(), 1);
}
