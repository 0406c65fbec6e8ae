//! Feature engineering for the demand model
//!
//! Turns a weather observation and a block timestamp into the flat row the
//! estimator was fit on. Column order is part of the artifact contract and is
//! pinned by [`FeatureSchema`].

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::WeatherObservation;

/// Bumped whenever the column set or order changes.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Column names in row order.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "Temperature",
    "Humidity",
    "WindSpeed",
    "is_holiday",
    "hour",
    "dayofweek",
    "month",
    "is_weekend",
];

pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Versioned column layout stored alongside a trained estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub columns: Vec<String>,
}

impl FeatureSchema {
    /// The layout produced by [`build_features`].
    pub fn current() -> Self {
        Self {
            version: FEATURE_SCHEMA_VERSION,
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Feature vector for one prediction block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandFeatures {
    /// Temperature (Celsius)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Always 0 in the prediction path; trained models never saw a holiday flag of 1.
    pub is_holiday: u8,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: u32,
    /// Month (1-12)
    pub month: u32,
    /// 1 on Saturday or Sunday
    pub is_weekend: u8,
}

impl DemandFeatures {
    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.is_holiday as f64,
            self.hour as f64,
            self.day_of_week as f64,
            self.month as f64,
            self.is_weekend as f64,
        ]
    }
}

/// Build the feature vector for `observation` at wall-clock time `at`.
///
/// Only the calendar fields depend on `at`; the weather scalars are copied
/// unchanged.
pub fn build_features(observation: &WeatherObservation, at: NaiveDateTime) -> DemandFeatures {
    let day_of_week = at.weekday().num_days_from_monday();

    DemandFeatures {
        temperature: observation.temperature,
        humidity: observation.humidity,
        wind_speed: observation.wind_speed,
        is_holiday: 0,
        hour: at.hour(),
        day_of_week,
        month: at.month(),
        is_weekend: u8::from(day_of_week >= 5), // Saturday (5) or Sunday (6)
    }
}
