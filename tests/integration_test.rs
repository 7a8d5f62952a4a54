use chrono::{Duration, NaiveDate};
use pharma_forecast::data::{assemble, DataLoader};
use pharma_forecast::features::training_table;
use pharma_forecast::forecast::Forecaster;
use pharma_forecast::reorder::{recommendations, NoLiveStock, ReorderOptions};
use pharma_forecast::training::{train, TrainingOptions};
use pharma_forecast::ArtifactStore;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_sales_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,product_id,product_name,category,quantity_sold,unit_price").unwrap();

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    for i in 0..90i64 {
        let date = start + Duration::days(i);
        writeln!(file, "{},1,Paracetamol 500,Analgesic,12,3.5", date).unwrap();
        writeln!(file, "{},2,Cough Syrup,Respiratory,25,7.0", date).unwrap();
    }

    file
}

fn write_climate_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,temp_min,temp_max,temp_avg,humidity,rainfall").unwrap();

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    for i in 0..90i64 {
        let date = start + Duration::days(i);
        writeln!(file, "{},14.0,28.0,21.0,60.0,1.0", date).unwrap();
    }

    file
}

fn write_products_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "product_id,name,category,price,barcode").unwrap();
    writeln!(file, "1,Paracetamol 500,Analgesic,3.5,8901234567890").unwrap();
    writeln!(file, "2,Cough Syrup,Respiratory,7.0,8909876543210").unwrap();
    file
}

#[test]
fn full_forecast_workflow() {
    // 1. Load the datasets from CSV
    let products = DataLoader::products_from_csv(write_products_csv().path()).unwrap();
    let sales = DataLoader::sales_from_csv(write_sales_csv().path()).unwrap();
    let climate = DataLoader::climate_from_csv(write_climate_csv().path()).unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(sales.len(), 180);
    assert_eq!(climate.len(), 90);

    // 2. Assemble and train
    let records = assemble(&sales, &climate);
    assert_eq!(records.len(), 180);

    let outcome = train(&records, &TrainingOptions::default()).unwrap();
    assert_eq!(outcome.candidates.len(), 2);

    // 3. Persist the artifact and load it back through the store
    let dir = tempfile::tempdir().unwrap();
    let artifact_path = dir.path().join("model.json");
    outcome.artifact.save(&artifact_path).unwrap();

    let store = ArtifactStore::new(artifact_path);
    let artifact = store.get().unwrap();

    // 4. Forecast 30 days for each product
    let rows = training_table(&records);
    let forecaster = Forecaster::new(artifact, &products, &rows, &climate);

    let start = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
    let forecast = forecaster.forecast(1, Some(start), 30).unwrap();
    assert_eq!(forecast.points.len(), 30);
    assert_eq!(forecast.product_name, "Paracetamol 500");
    assert!(forecast
        .points
        .iter()
        .all(|p| p.predicted_quantity >= 8 && p.predicted_quantity <= 16));

    let forecast_2 = forecaster.forecast(2, Some(start), 30).unwrap();
    assert!(forecast_2.summary.total_predicted > forecast.summary.total_predicted);

    // 5. Reorder advice over the same history
    let recs = recommendations(&forecaster, &sales, &NoLiveStock, &ReorderOptions::default());
    assert_eq!(recs.len(), 2);
    // Most urgent first
    assert!(recs[0].days_of_stock <= recs[1].days_of_stock);

    // 6. The forecast response serializes for the API layer
    let json = serde_json::to_string(&forecast).unwrap();
    assert!(json.contains("\"product_id\":1"));
    assert!(json.contains("\"total_predicted\""));
}
