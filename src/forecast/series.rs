use chrono::Duration;
use thiserror::Error;
use tracing::debug;

use super::features::build_features;
use crate::domain::{
    BlockTime, ForecastSummary, PredictionBlock, WeatherObservation, BLOCKS_PER_DAY, BLOCK_MINUTES,
};
use crate::ml::{DemandModel, ModelError};

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("block {index} start time is out of range")]
    TimeOverflow { index: usize },

    #[error("block {index} prediction is not a finite number: {value}")]
    NonFinite { index: usize, value: f64 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Predict 96 consecutive 10-minute blocks starting at `base`.
///
/// The weather in `observation` is held constant; only the calendar features
/// move with each block. Any block failure aborts the whole series, including
/// a model output that is NaN or infinite.
pub fn predict_series(
    model: &DemandModel,
    base: BlockTime,
    observation: &WeatherObservation,
) -> Result<Vec<PredictionBlock>, ForecastError> {
    let floor = model.floor();
    let mut blocks = Vec::with_capacity(BLOCKS_PER_DAY);

    for index in 0..BLOCKS_PER_DAY {
        let start_time = base
            .checked_add(Duration::minutes(BLOCK_MINUTES * index as i64))
            .ok_or(ForecastError::TimeOverflow { index })?;
        let features = build_features(observation, start_time.local());
        let value = model.predict_one(&features)?;
        if !value.is_finite() {
            return Err(ForecastError::NonFinite { index, value });
        }
        let value = value.max(floor);
        blocks.push(PredictionBlock { start_time, value });
    }

    debug!(
        base = %base,
        loaded = model.is_loaded(),
        first = blocks.first().map(|b| b.value),
        "series predicted"
    );
    Ok(blocks)
}

/// Forecast the 24 hours following the observation's own timestamp.
pub fn forecast_day(
    model: &DemandModel,
    observation: &WeatherObservation,
) -> Result<ForecastSummary, ForecastError> {
    Ok(ForecastSummary {
        blocks: predict_series(model, observation.datetime, observation)?,
        confidence: model.confidence(),
    })
}
