use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::info;

use super::{error::ApiError, now_local};
use crate::domain::{BlockTime, PredictionBlock, WeatherObservation};
use crate::forecast::forecast_day;
use crate::service::AppState;

pub const FORECAST_PERIOD: &str = "24 hours (96 blocks of 10 minutes)";

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predictions: Vec<f64>,
    pub confidence: f64,
    pub timestamp: BlockTime,
    pub forecast_period: &'static str,
    pub location: String,
    /// The same values paired with their block start times
    pub blocks: Vec<PredictionBlock>,
}

/// POST /predict - 24 hour forecast in 96 ten-minute blocks
pub async fn predict(
    State(st): State<AppState>,
    WithRejection(Json(observation), _): WithRejection<Json<WeatherObservation>, ApiError>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let summary = forecast_day(&st.model, &observation)
        .map_err(|e| ApiError::prediction(e, st.cfg.server.expose_error_detail))?;

    info!(
        start = %observation.datetime,
        blocks = summary.blocks.len(),
        confidence = summary.confidence,
        "forecast served"
    );

    Ok(Json(PredictionResponse {
        predictions: summary.values(),
        confidence: summary.confidence,
        timestamp: now_local(),
        forecast_period: FORECAST_PERIOD,
        location: st.cfg.site.location.clone(),
        blocks: summary.blocks,
    }))
}
