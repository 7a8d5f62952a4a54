//! Dataset assembly: product catalog, sales and climate observations

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Season of the year, following the original regional calendar
/// (Dec-Feb Winter, Mar-May Summer, Jun-Sep Monsoon, Oct-Nov Spring).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Summer,
    Monsoon,
    Spring,
}

impl Season {
    /// Season a given calendar month falls into
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Summer,
            6..=9 => Season::Monsoon,
            _ => Season::Spring,
        }
    }

    /// Canonical season name
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Summer => "Summer",
            Season::Monsoon => "Monsoon",
            Season::Spring => "Spring",
        }
    }

    /// All seasons, in encoding order
    pub fn all() -> [Season; 4] {
        [Season::Winter, Season::Summer, Season::Monsoon, Season::Spring]
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Season {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Winter" => Ok(Season::Winter),
            "Summer" => Ok(Season::Summer),
            "Monsoon" => Ok(Season::Monsoon),
            "Spring" => Ok(Season::Spring),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown season: {}",
                other
            ))),
        }
    }
}

/// Full weekday name as used by the encoding tables
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Entry in the product catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: u32,
    /// Product name
    pub name: String,
    /// Product category
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Barcode, if known
    pub barcode: Option<String>,
}

/// One recorded sale of a product on a given day.
///
/// Calendar fields are derived from the date at construction so that the
/// observation is internally consistent regardless of what the source file
/// carried.
#[derive(Debug, Clone)]
pub struct SalesObservation {
    /// Date of the sale
    pub date: NaiveDate,
    /// Product id
    pub product_id: u32,
    /// Product name
    pub product_name: String,
    /// Product category
    pub category: String,
    /// Units sold on this day
    pub quantity_sold: f64,
    /// Unit price at time of sale
    pub unit_price: f64,
    /// Day of week
    pub weekday: Weekday,
    /// Whether the date falls on a weekend
    pub is_weekend: bool,
    /// Calendar month (1-12)
    pub month: u32,
    /// Season the date falls into
    pub season: Season,
    /// ISO calendar week
    pub calendar_week: u32,
}

impl SalesObservation {
    /// Create a sales observation, deriving the calendar fields from the date
    pub fn new(
        date: NaiveDate,
        product_id: u32,
        product_name: impl Into<String>,
        category: impl Into<String>,
        quantity_sold: f64,
        unit_price: f64,
    ) -> Self {
        let weekday = date.weekday();
        Self {
            date,
            product_id,
            product_name: product_name.into(),
            category: category.into(),
            quantity_sold,
            unit_price,
            weekday,
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            month: date.month(),
            season: Season::for_month(date.month()),
            calendar_week: date.iso_week().week(),
        }
    }

    /// Revenue of this observation
    pub fn total(&self) -> f64 {
        self.quantity_sold * self.unit_price
    }
}

/// One recorded day of weather, independent of any product
#[derive(Debug, Clone)]
pub struct ClimateObservation {
    /// Date of the observation
    pub date: NaiveDate,
    /// Minimum temperature
    pub temp_min: f64,
    /// Maximum temperature
    pub temp_max: f64,
    /// Average temperature
    pub temp_avg: f64,
    /// Relative humidity
    pub humidity: f64,
    /// Rainfall
    pub rainfall: f64,
    /// Season the date falls into
    pub season: Season,
}

impl ClimateObservation {
    /// Create a climate observation, deriving the season from the date
    pub fn new(
        date: NaiveDate,
        temp_min: f64,
        temp_max: f64,
        temp_avg: f64,
        humidity: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            date,
            temp_min,
            temp_max,
            temp_avg,
            humidity,
            rainfall,
            season: Season::for_month(date.month()),
        }
    }
}

/// A sales observation joined with the climate recorded on the same date
#[derive(Debug, Clone)]
pub struct SalesRecord {
    /// The sale
    pub sale: SalesObservation,
    /// Weather on the day of the sale
    pub climate: ClimateObservation,
}

/// Join sales with climate observations by date.
///
/// Sales on dates without a climate observation are skipped rather than
/// failing the whole assembly; input order is preserved. Pure transform,
/// inputs are not mutated.
pub fn assemble(sales: &[SalesObservation], climate: &[ClimateObservation]) -> Vec<SalesRecord> {
    let by_date: HashMap<NaiveDate, &ClimateObservation> =
        climate.iter().map(|c| (c.date, c)).collect();

    let mut records = Vec::with_capacity(sales.len());
    let mut skipped = 0usize;
    for sale in sales {
        match by_date.get(&sale.date) {
            Some(climate) => records.push(SalesRecord {
                sale: sale.clone(),
                climate: (*climate).clone(),
            }),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "sales rows without matching climate dropped");
    }

    records
}

/// CSV loader for the input datasets
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the product catalog from a CSV file with columns
    /// `product_id,name,category,price,barcode`
    pub fn products_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Product>> {
        let df = Self::read_csv(path)?;

        let ids = Self::column_as_i64(&df, "product_id")?;
        let names = Self::column_as_str(&df, "name")?;
        let categories = Self::column_as_str(&df, "category")?;
        let prices = Self::column_as_f64(&df, "price")?;
        let barcodes = Self::column_as_str(&df, "barcode")?;

        let mut products = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (id, name, category, price) =
                match (&ids[i], &names[i], &categories[i], &prices[i]) {
                    (Some(id), Some(name), Some(category), Some(price)) => {
                        (*id, name.clone(), category.clone(), *price)
                    }
                    _ => continue,
                };
            products.push(Product {
                id: id as u32,
                name,
                category,
                price,
                barcode: barcodes[i].clone(),
            });
        }

        Ok(products)
    }

    /// Load historical sales from a CSV file with columns
    /// `date,product_id,product_name,category,quantity_sold,unit_price`
    pub fn sales_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SalesObservation>> {
        let df = Self::read_csv(path)?;

        let dates = Self::column_as_str(&df, "date")?;
        let ids = Self::column_as_i64(&df, "product_id")?;
        let names = Self::column_as_str(&df, "product_name")?;
        let categories = Self::column_as_str(&df, "category")?;
        let quantities = Self::column_as_f64(&df, "quantity_sold")?;
        let prices = Self::column_as_f64(&df, "unit_price")?;

        let mut sales = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for i in 0..df.height() {
            let parsed = match (&dates[i], &ids[i], &names[i], &categories[i], &quantities[i]) {
                (Some(date), Some(id), Some(name), Some(category), Some(quantity)) => {
                    Self::parse_date(date).map(|d| (d, *id, name, category, *quantity))
                }
                _ => None,
            };
            match parsed {
                Some((date, id, name, category, quantity)) => {
                    sales.push(SalesObservation::new(
                        date,
                        id as u32,
                        name.clone(),
                        category.clone(),
                        quantity,
                        prices[i].unwrap_or(0.0),
                    ));
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "malformed sales rows skipped");
        }

        Ok(sales)
    }

    /// Load climate observations from a CSV file with columns
    /// `date,temp_min,temp_max,temp_avg,humidity,rainfall`
    pub fn climate_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ClimateObservation>> {
        let df = Self::read_csv(path)?;

        let dates = Self::column_as_str(&df, "date")?;
        let temp_min = Self::column_as_f64(&df, "temp_min")?;
        let temp_max = Self::column_as_f64(&df, "temp_max")?;
        let temp_avg = Self::column_as_f64(&df, "temp_avg")?;
        let humidity = Self::column_as_f64(&df, "humidity")?;
        let rainfall = Self::column_as_f64(&df, "rainfall")?;

        let mut climate = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for i in 0..df.height() {
            let row = (
                dates[i].as_deref().and_then(Self::parse_date),
                temp_min[i],
                temp_max[i],
                temp_avg[i],
                humidity[i],
                rainfall[i],
            );
            match row {
                (Some(date), Some(min), Some(max), Some(avg), Some(hum), Some(rain)) => {
                    climate.push(ClimateObservation::new(date, min, max, avg, hum, rain));
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "malformed climate rows skipped");
        }

        Ok(climate)
    }

    /// Read a CSV file into a DataFrame
    fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;
        Ok(df)
    }

    fn parse_date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    /// Get a column as per-row optional f64 values, preserving row alignment
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;
        let casted = col.cast(&DataType::Float64).map_err(|_| {
            ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64",
                column_name
            ))
        })?;
        Ok(casted.f64()?.into_iter().collect())
    }

    /// Get a column as per-row optional i64 values, preserving row alignment
    fn column_as_i64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<i64>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;
        let casted = col.cast(&DataType::Int64).map_err(|_| {
            ForecastError::DataError(format!(
                "Column '{}' cannot be converted to i64",
                column_name
            ))
        })?;
        Ok(casted.i64()?.into_iter().collect())
    }

    /// Get a column as per-row optional strings, preserving row alignment
    fn column_as_str(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;
        let casted = col.cast(&DataType::Utf8).map_err(|_| {
            ForecastError::DataError(format!(
                "Column '{}' cannot be converted to text",
                column_name
            ))
        })?;
        Ok(casted
            .utf8()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }
}
