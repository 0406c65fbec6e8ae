use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ml::ModelMetadata;
use crate::service::AppState;

#[derive(Debug, Serialize)]
pub struct LoadedModelInfo<'a> {
    pub model_loaded: bool,
    pub model_metadata: &'a ModelMetadata,
    pub features_count: usize,
    pub location: &'a str,
    pub assignment: &'a str,
}

#[derive(Debug, Serialize)]
pub struct FallbackModelInfo<'a> {
    pub model_loaded: bool,
    pub message: &'static str,
    pub location: &'a str,
    pub assignment: &'a str,
}

/// GET /model-info - Loaded estimator metadata, or a fallback notice
pub async fn get_model_info(State(st): State<AppState>) -> Response {
    let site = &st.cfg.site;
    match st.model.loaded() {
        Some(model) => Json(LoadedModelInfo {
            model_loaded: true,
            model_metadata: model.metadata(),
            features_count: model.features_count(),
            location: &site.location,
            assignment: &site.operator,
        })
        .into_response(),
        None => Json(FallbackModelInfo {
            model_loaded: false,
            message: "Model not loaded - using mock predictions",
            location: &site.location,
            assignment: &site.operator,
        })
        .into_response(),
    }
}
