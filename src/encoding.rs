//! Categorical encodings shared between training and inference

use crate::data::{weekday_name, Season};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel code for category values not seen during training.
///
/// An inference-time lookup miss resolves to this value instead of failing;
/// the model accepts it as an ordinary numeric feature.
pub const UNSEEN_CATEGORY: i64 = -1;

/// Integer codes for season, weekday and product category.
///
/// Built once at training time and persisted inside the model artifact;
/// never mutated at inference time. The season and weekday vocabularies are
/// fixed enumerations whose codes must stay stable for the lifetime of a
/// trained artifact, since the model has learned against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingTable {
    seasons: BTreeMap<String, i64>,
    weekdays: BTreeMap<String, i64>,
    categories: BTreeMap<String, i64>,
}

impl EncodingTable {
    /// Build the table, deriving the category vocabulary from the distinct
    /// category values observed in the training corpus, in encounter order.
    pub fn from_categories<'a, I>(categories: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seasons = Season::all()
            .iter()
            .enumerate()
            .map(|(code, season)| (season.as_str().to_string(), code as i64))
            .collect();

        let weekdays = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .iter()
        .map(|wd| {
            (
                weekday_name(*wd).to_string(),
                wd.num_days_from_monday() as i64,
            )
        })
        .collect();

        let mut table = BTreeMap::new();
        let mut next_code = 0i64;
        for category in categories {
            if !table.contains_key(category) {
                table.insert(category.to_string(), next_code);
                next_code += 1;
            }
        }

        Self {
            seasons,
            weekdays,
            categories: table,
        }
    }

    /// Code for a season (Winter 0, Summer 1, Monsoon 2, Spring 3)
    pub fn encode_season(&self, season: Season) -> i64 {
        self.seasons
            .get(season.as_str())
            .copied()
            .unwrap_or(UNSEEN_CATEGORY)
    }

    /// Code for a weekday (Monday 0 through Sunday 6)
    pub fn encode_weekday(&self, weekday: Weekday) -> i64 {
        self.weekdays
            .get(weekday_name(weekday))
            .copied()
            .unwrap_or(UNSEEN_CATEGORY)
    }

    /// Code for a product category; unseen categories resolve to the
    /// [`UNSEEN_CATEGORY`] sentinel, never an error
    pub fn encode_category(&self, category: &str) -> i64 {
        self.categories
            .get(category)
            .copied()
            .unwrap_or(UNSEEN_CATEGORY)
    }

    /// Category name for a code produced by [`encode_category`].
    ///
    /// Returns `None` for the sentinel and for codes outside the vocabulary.
    ///
    /// [`encode_category`]: EncodingTable::encode_category
    pub fn decode_category(&self, code: i64) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, &c)| c == code)
            .map(|(name, _)| name.as_str())
    }

    /// Number of categories in the training vocabulary
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
