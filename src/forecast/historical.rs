//! Historical consumption data
//!
//! Reads the utility's consumption CSV when it is present. Any failure to read
//! it degrades to synthetic feeder data so the endpoint keeps answering.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime, Timelike};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{BlockTime, BLOCK_MINUTES};

/// One CSV row, keyed by column name.
pub type HistoricalRow = Map<String, Value>;

#[derive(Debug, Error)]
pub enum HistoricalError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 132 kV feeders in the consumption dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feeder {
    F1,
    F2,
    F3,
}

impl Feeder {
    pub fn column(&self) -> &'static str {
        match self {
            Feeder::F1 => "F1_132KV_PowerConsumption",
            Feeder::F2 => "F2_132KV_PowerConsumption",
            Feeder::F3 => "F3_132KV_PowerConsumption",
        }
    }

    /// (base, daily amplitude, noise std-dev) of the synthetic series
    fn synthetic_profile(&self) -> (f64, f64, f64) {
        match self {
            Feeder::F1 => (25_000.0, 5_000.0, 1_000.0),
            Feeder::F2 => (18_000.0, 3_000.0, 800.0),
            Feeder::F3 => (22_000.0, 4_000.0, 900.0),
        }
    }
}

/// A typed historical measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(rename = "Datetime")]
    pub datetime: BlockTime,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Humidity")]
    pub humidity: f64,
    #[serde(rename = "WindSpeed")]
    pub wind_speed: f64,
    #[serde(rename = "F1_132KV_PowerConsumption")]
    pub f1_consumption: f64,
    #[serde(rename = "F2_132KV_PowerConsumption")]
    pub f2_consumption: f64,
    #[serde(rename = "F3_132KV_PowerConsumption")]
    pub f3_consumption: f64,
}

impl HistoricalRecord {
    pub fn consumption(&self, feeder: Feeder) -> f64 {
        match feeder {
            Feeder::F1 => self.f1_consumption,
            Feeder::F2 => self.f2_consumption,
            Feeder::F3 => self.f3_consumption,
        }
    }
}

/// Where a page of history came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    File,
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct HistoricalPage {
    pub data: Vec<HistoricalRow>,
    pub total_records: usize,
    pub source: DataSource,
}

/// Reads pages of history from a CSV file, falling back to synthetic rows
#[derive(Debug, Clone)]
pub struct HistoricalReader {
    path: PathBuf,
    synthetic_total: usize,
}

impl HistoricalReader {
    pub fn new(path: impl Into<PathBuf>, synthetic_total: usize) -> Self {
        Self {
            path: path.into(),
            synthetic_total,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows `offset..offset+limit` of the file, or `limit` synthetic rows
    /// ending around `now` if the file cannot be read.
    pub fn read_page<R: Rng>(&self, limit: usize, offset: usize, now: NaiveDateTime, rng: &mut R) -> HistoricalPage {
        match self.read_file_page(limit, offset) {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "historical data unavailable - serving synthetic records");
                let start = now - Duration::days(30);
                let data = generate_history(rng, start, limit)
                    .into_iter()
                    .filter_map(|r| match serde_json::to_value(r) {
                        Ok(Value::Object(row)) => Some(row),
                        _ => None,
                    })
                    .collect();
                HistoricalPage {
                    data,
                    total_records: self.synthetic_total,
                    source: DataSource::Synthetic,
                }
            }
        }
    }

    fn read_file_page(&self, limit: usize, offset: usize) -> Result<HistoricalPage, HistoricalError> {
        let csv_err = |source| HistoricalError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut reader = csv::Reader::from_path(&self.path).map_err(csv_err)?;
        let headers = reader.headers().map_err(csv_err)?.clone();

        let mut total_records = 0;
        let mut data = Vec::new();
        let end = offset.saturating_add(limit);
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            if (offset..end).contains(&total_records) {
                data.push(
                    headers
                        .iter()
                        .zip(record.iter())
                        .map(|(h, v)| (h.to_string(), cell_value(v)))
                        .collect(),
                );
            }
            total_records += 1;
        }

        debug!(path = %self.path.display(), total_records, returned = data.len(), "historical page read");
        Ok(HistoricalPage {
            data,
            total_records,
            source: DataSource::File,
        })
    }
}

/// Read every row of a consumption CSV into typed records.
pub fn read_records(path: &Path) -> Result<Vec<HistoricalRecord>, HistoricalError> {
    let csv_err = |source| HistoricalError::Csv {
        path: path.to_path_buf(),
        source,
    };

    csv::Reader::from_path(path)
        .map_err(csv_err)?
        .deserialize()
        .collect::<Result<Vec<HistoricalRecord>, _>>()
        .map_err(csv_err)
}

fn cell_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

/// `count` synthetic records, one per 10-minute block starting at `start`.
pub fn generate_history<R: Rng>(rng: &mut R, start: NaiveDateTime, count: usize) -> Vec<HistoricalRecord> {
    let mut noise = |std_dev: f64| -> f64 {
        Normal::new(0.0, std_dev)
            .map(|n| n.sample(&mut *rng))
            .unwrap_or(0.0)
    };

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let t = start + Duration::minutes(BLOCK_MINUTES * i as i64);
        let daily = (2.0 * PI * t.hour() as f64 / 24.0).sin();

        let [f1, f2, f3] = [Feeder::F1, Feeder::F2, Feeder::F3].map(|feeder| {
            let (base, amp, std_dev) = feeder.synthetic_profile();
            base + amp * daily + noise(std_dev)
        });

        out.push(HistoricalRecord {
            datetime: BlockTime::naive(t),
            temperature: 25.0 + 5.0 * daily + noise(2.0),
            humidity: 60.0 + 15.0 * daily + noise(5.0),
            wind_speed: 3.0 + noise(1.0),
            f1_consumption: f1,
            f2_consumption: f2,
            f3_consumption: f3,
        });
    }
    out
}
