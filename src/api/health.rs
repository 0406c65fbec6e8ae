use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::now_local;
use crate::domain::BlockTime;
use crate::service::AppState;

const OPERATIONAL: &str = "operational";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: BlockTime,
    model_loaded: bool,
    location: String,
    services: ServiceStatus,
}

/// Status of each served component
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    prediction: &'static str,
    weather: &'static str,
    holidays: &'static str,
    historical_data: &'static str,
}

/// GET /health - Health check endpoint
///
/// The service degrades instead of failing, so every component reports operational.
pub async fn health_check(State(st): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: now_local(),
        model_loaded: st.model.is_loaded(),
        location: st.cfg.site.location.clone(),
        services: ServiceStatus {
            prediction: OPERATIONAL,
            weather: OPERATIONAL,
            holidays: OPERATIONAL,
            historical_data: OPERATIONAL,
        },
    })
}

/// GET /health/live - Simple liveness check
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
