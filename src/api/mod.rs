pub mod error;
pub mod health;
pub mod historical;
pub mod holidays;
pub mod model_info;
pub mod predict;
pub mod root;
pub mod weather;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Router,
};
use chrono::Local;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{config::ServerConfig, domain::BlockTime, service::AppState};

pub fn router(state: AppState) -> Router {
    let server = state.cfg.server.clone();

    Router::new()
        .route("/", get(root::root))
        .route("/predict", post(predict::predict))
        .route("/weather", get(weather::get_weather_forecast))
        .route("/holidays", get(holidays::get_holidays))
        .route("/historical-data", get(historical::get_historical_data))
        .route("/model-info", get(model_info::get_model_info))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .with_state(state)
        .layer(cors_layer(&server))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(server.request_timeout_secs),
                )),
        )
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_allow_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Current local wall-clock time, as rendered in response timestamps.
pub(crate) fn now_local() -> BlockTime {
    BlockTime::naive(Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut cfg = Config::default();
        cfg.data.historical_csv_path = "/no/such/history.csv".into();
        cfg.weather.seed = Some(42);
        router(AppState::new(cfg))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_root_descriptor() {
        let (status, body) = get_json(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Utility Consumption Prediction API");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["assignment"], "Apex Power & Utilities (APU)");
        assert_eq!(body["model_loaded"], false);
    }

    #[tokio::test]
    async fn test_liveness() {
        let resp = app()
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_services_operational() {
        let (status, body) = get_json(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["historical_data"], "operational");
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_weather_default_hours() {
        let (status, body) = get_json(app(), "/weather").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weather_data"].as_array().unwrap().len(), 24);
        assert_eq!(body["forecast_period"], "24 hours");
    }

    #[tokio::test]
    async fn test_weather_hours_out_of_bounds() {
        let (status, body) = get_json(app(), "/weather?hours=721").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "ValidationError");

        let (status, _) = get_json(app(), "/weather?hours=-1").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_historical_limit_out_of_bounds() {
        let (status, _) = get_json(app(), "/historical-data?limit=10001").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_fallback_model_info() {
        let (_, body) = get_json(app(), "/model-info").await;
        assert_eq!(body["model_loaded"], false);
        assert_eq!(body["message"], "Model not loaded - using mock predictions");
        assert!(body.get("model_metadata").is_none());
    }

    async fn allowed_origin(app: Router, origin: &str) -> Option<String> {
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_with_explicit_origins() {
        let mut cfg = Config::default();
        // The invalid entry is skipped, not fatal.
        cfg.server.cors_allow_origins = vec!["http://localhost:3000".to_string(), "bad\norigin".to_string()];
        let app = router(AppState::new(cfg));

        assert_eq!(
            allowed_origin(app.clone(), "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(allowed_origin(app, "http://evil.example").await, None);
    }

    #[tokio::test]
    async fn test_cors_wildcard() {
        assert_eq!(allowed_origin(app(), "http://anywhere.example").await.as_deref(), Some("*"));
    }
}
