use serde::{Deserialize, Serialize};

use super::BlockTime;

/// One weather reading: the `/predict` request body and a `/weather` forecast row.
///
/// Values are not range-checked here. Anomalous inputs flow through to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Air temperature (Celsius)
    pub temperature: f64,
    /// Relative humidity (0-100%)
    pub humidity: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Cloud cover (0-100%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
    pub datetime: BlockTime,
}
