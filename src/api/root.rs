use axum::{extract::State, Json};
use serde::Serialize;

use crate::service::AppState;

/// Service descriptor
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: &'static str,
    pub location: String,
    pub assignment: String,
    pub model_loaded: bool,
}

/// GET / - Service descriptor
pub async fn root(State(st): State<AppState>) -> Json<RootResponse> {
    let site = &st.cfg.site;
    Json(RootResponse {
        message: site.service_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        location: site.location.clone(),
        assignment: site.operator.clone(),
        model_loaded: st.model.is_loaded(),
    })
}
