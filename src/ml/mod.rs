//! Machine Learning Module
//!
//! Serving side of the demand model:
//! - Artifact loading with schema checks
//! - The `Loaded | Fallback` model adapter used by the prediction stepper
//! - SmartCore random forest and linear estimators
//! - A small trainer that produces artifacts from historical records

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod artifact;
pub mod models;
pub mod smartcore;
pub mod training;

pub use artifact::{ArtifactError, ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use models::{DemandModel, Estimator, FallbackModel, LinearRegressionModel, LoadedModel, Regressor};
pub use self::smartcore::RandomForestModel;

/// Errors raised while running a loaded estimator
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Feature count mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Model returned empty predictions")]
    EmptyPrediction,
}

/// ML Model Type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelType {
    LinearRegression,
    RandomForest,
}

/// ML Model Metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    pub version: String,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub training_samples: usize,
    pub validation_metrics: ValidationMetrics,
    pub feature_names: Vec<String>,
    /// Column the estimator was fit against, e.g. `F1_132KV_PowerConsumption`
    pub target: String,
}

/// Validation Metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationMetrics {
    pub mae: f64,  // Mean Absolute Error
    pub rmse: f64, // Root Mean Square Error
    pub mape: f64, // Mean Absolute Percentage Error
    pub r2: f64,   // R-squared
}

impl ValidationMetrics {
    pub fn new(mae: f64, rmse: f64, mape: f64, r2: f64) -> Self {
        Self {
            mae,
            rmse,
            mape,
            r2,
        }
    }

    /// Check if metrics meet quality thresholds
    pub fn meets_quality_threshold(&self, max_mape: f64, min_r2: f64) -> bool {
        self.mape <= max_mape && self.r2 >= min_r2
    }
}

/// Z-score scaling parameters fitted alongside an estimator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl FeatureScaler {
    /// Fit per-column mean and standard deviation.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let width = rows.first()?.len();
        let n = rows.len() as f64;

        let means: Vec<f64> = (0..width)
            .map(|c| rows.iter().map(|r| r[c]).sum::<f64>() / n)
            .collect();
        let stds = (0..width)
            .map(|c| {
                let var = rows.iter().map(|r| (r[c] - means[c]).powi(2)).sum::<f64>() / n;
                var.sqrt()
            })
            .collect();

        Some(Self { means, stds })
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Standardize a row using z-score normalization
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.means.len() || row.len() != self.stds.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.means.len(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(f, (mean, std))| {
                if std.abs() < 1e-10 {
                    0.0 // Constant column
                } else {
                    (f - mean) / std
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler_transform() {
        let scaler = FeatureScaler {
            means: vec![10.0, 20.0, 30.0],
            stds: vec![2.0, 5.0, 0.0],
        };

        let scaled = scaler.transform(&[12.0, 10.0, 99.0]).unwrap();
        assert_eq!(scaled, vec![1.0, -2.0, 0.0]);
    }

    #[test]
    fn test_scaler_shape_mismatch() {
        let scaler = FeatureScaler {
            means: vec![0.0; 3],
            stds: vec![1.0; 3],
        };
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_scaler_fit() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = FeatureScaler::fit(&rows).unwrap();
        assert_eq!(scaler.means, vec![2.0, 5.0]);
        assert_eq!(scaler.stds, vec![1.0, 0.0]);
        assert!(FeatureScaler::fit(&[]).is_none());
    }

    #[test]
    fn test_validation_metrics() {
        let metrics = ValidationMetrics::new(0.5, 0.7, 5.0, 0.95);

        assert!(metrics.meets_quality_threshold(10.0, 0.9));
        assert!(!metrics.meets_quality_threshold(3.0, 0.9));
        assert!(!metrics.meets_quality_threshold(10.0, 0.97));
    }
}
