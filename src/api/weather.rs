//! Synthetic weather forecast endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{error::ApiError, now_local};
use crate::domain::WeatherObservation;
use crate::forecast::weather::SyntheticWeather;
use crate::service::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct WeatherQuery {
    #[serde(default = "default_hours")]
    #[validate(range(max = 720))]
    pub hours: u32,
}

fn default_hours() -> u32 {
    24
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub weather_data: Vec<WeatherObservation>,
    pub location: String,
    pub forecast_period: String,
}

/// GET /weather?hours=N - Hourly synthetic forecast starting now
pub async fn get_weather_forecast(
    State(st): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<WeatherQuery>, ApiError>,
) -> Result<Json<WeatherResponse>, ApiError> {
    q.validate()?;

    let start = now_local().local();
    let weather_data = SyntheticWeather::new(st.noise_rng()).forecast(start, q.hours);

    Ok(Json(WeatherResponse {
        weather_data,
        location: st.cfg.site.location.clone(),
        forecast_period: format!("{} hours", q.hours),
    }))
}
