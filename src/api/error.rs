use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::forecast::ForecastError;

const OPAQUE_DETAIL: &str = "An internal error occurred";

/// API error types that can be returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("{0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A block prediction failed; the whole forecast is dropped.
    #[error("{source}")]
    Prediction {
        source: ForecastError,
        expose_detail: bool,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
    error: &'static str,
}

impl ApiError {
    pub fn prediction(source: ForecastError, expose_detail: bool) -> Self {
        ApiError::Prediction {
            source,
            expose_detail,
        }
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::InvalidQuery(_) | ApiError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Prediction { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type string
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidBody(_) | ApiError::InvalidQuery(_) => "RequestValidationError",
            ApiError::Validation(_) => "ValidationError",
            ApiError::Prediction { .. } => "PredictionError",
            ApiError::Internal(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.error_type();

        let detail = match &self {
            ApiError::Prediction {
                source,
                expose_detail,
            } => {
                tracing::error!(error = %source, error_debug = ?source, "prediction failed");
                if *expose_detail {
                    source.to_string()
                } else {
                    OPAQUE_DETAIL.to_string()
                }
            }
            ApiError::Internal(_) => {
                tracing::error!(error = %self, "API error occurred");
                OPAQUE_DETAIL.to_string()
            }
            _ => {
                tracing::debug!(error = %self, "Client error");
                self.to_string()
            }
        };

        (status, Json(ErrorResponse { detail, error })).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        ApiError::Internal(error.to_string())
    }
}
