//! Model adapter
//!
//! [`DemandModel`] is decided once at startup: either a trained estimator was
//! loaded from an artifact, or the service runs on the closed-form fallback.
//! Nothing switches between the two afterwards.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::artifact::ModelArtifact;
use super::smartcore::RandomForestModel;
use super::{ModelError, ModelMetadata};
use crate::forecast::features::DemandFeatures;

/// Confidence reported for series produced by a trained estimator.
pub const LOADED_CONFIDENCE: f64 = 0.85;
/// Confidence reported in fallback mode.
pub const FALLBACK_CONFIDENCE: f64 = 0.60;

/// Trait for fitted regressors
pub trait Regressor: Send + Sync {
    /// Predict a single value from a row in schema order
    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError>;

    /// Number of columns the regressor was fit on
    fn n_features(&self) -> usize;
}

/// Linear Regression Model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearRegressionModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressionModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Regressor for LinearRegressionModel {
    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.coefficients.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.coefficients.iter())
            .map(|(f, c)| f * c)
            .sum::<f64>()
            + self.intercept)
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Estimators an artifact can carry
#[derive(Debug, Serialize, Deserialize)]
pub enum Estimator {
    RandomForest(RandomForestModel),
    Linear(LinearRegressionModel),
}

impl Regressor for Estimator {
    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        match self {
            Estimator::RandomForest(m) => m.predict_row(row),
            Estimator::Linear(m) => m.predict_row(row),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            Estimator::RandomForest(m) => m.n_features(),
            Estimator::Linear(m) => m.n_features(),
        }
    }
}

/// A validated artifact ready to serve
#[derive(Debug)]
pub struct LoadedModel {
    artifact: ModelArtifact,
}

impl LoadedModel {
    /// Wrap an artifact, rejecting it if it does not match the feature builder.
    pub fn new(artifact: ModelArtifact) -> Result<Self, super::ArtifactError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.artifact.metadata
    }

    pub fn features_count(&self) -> usize {
        self.artifact.schema.len()
    }

    pub fn predict_one(&self, features: &DemandFeatures) -> Result<f64, ModelError> {
        let row = features.to_row();
        match &self.artifact.scaler {
            Some(scaler) => {
                let scaled = scaler.transform(&row)?;
                self.artifact.estimator.predict_row(&scaled)
            }
            None => self.artifact.estimator.predict_row(&row),
        }
    }
}

/// Closed-form stand-in used when no trained estimator is available
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackModel;

impl FallbackModel {
    pub const BASE_CONSUMPTION: f64 = 25_000.0;
    pub const FLOOR: f64 = 15_000.0;

    /// `25000 + 100*(T-25) + 50*(H-50) + 2000*sin(2*pi*hour/24)`, floored at 15000.
    pub fn predict_one(&self, features: &DemandFeatures) -> f64 {
        let temp_effect = (features.temperature - 25.0) * 100.0;
        let humidity_effect = (features.humidity - 50.0) * 50.0;
        let hour_effect = 2000.0 * (2.0 * PI * features.hour as f64 / 24.0).sin();

        (Self::BASE_CONSUMPTION + temp_effect + humidity_effect + hour_effect).max(Self::FLOOR)
    }
}

/// Model state chosen once at startup
#[derive(Debug)]
pub enum DemandModel {
    Loaded(LoadedModel),
    Fallback(FallbackModel),
}

impl DemandModel {
    /// Try to load the artifact at `path`; any failure degrades to fallback mode.
    pub fn load_or_fallback(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("no model artifact configured - using fallback predictions");
            return DemandModel::Fallback(FallbackModel);
        };

        match ModelArtifact::load(path).and_then(LoadedModel::new) {
            Ok(model) => {
                info!(
                    path = %path.display(),
                    model_id = %model.metadata().model_id,
                    model_type = ?model.metadata().model_type,
                    "model artifact loaded"
                );
                DemandModel::Loaded(model)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model artifact unavailable - using fallback predictions");
                DemandModel::Fallback(FallbackModel)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, DemandModel::Loaded(_))
    }

    pub fn confidence(&self) -> f64 {
        match self {
            DemandModel::Loaded(_) => LOADED_CONFIDENCE,
            DemandModel::Fallback(_) => FALLBACK_CONFIDENCE,
        }
    }

    /// Lowest value a block may report.
    pub fn floor(&self) -> f64 {
        match self {
            DemandModel::Loaded(_) => 0.0,
            DemandModel::Fallback(_) => FallbackModel::FLOOR,
        }
    }

    pub fn predict_one(&self, features: &DemandFeatures) -> Result<f64, ModelError> {
        match self {
            DemandModel::Loaded(model) => model.predict_one(features),
            DemandModel::Fallback(model) => Ok(model.predict_one(features)),
        }
    }

    pub fn loaded(&self) -> Option<&LoadedModel> {
        match self {
            DemandModel::Loaded(model) => Some(model),
            DemandModel::Fallback(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeatherObservation;
    use crate::forecast::features::build_features;
    use proptest::prelude::*;

    fn features(temperature: f64, humidity: f64, hour: u32) -> DemandFeatures {
        DemandFeatures {
            temperature,
            humidity,
            wind_speed: 5.0,
            is_holiday: 0,
            hour,
            day_of_week: 5,
            month: 6,
            is_weekend: 1,
        }
    }

    #[test]
    fn test_fallback_reference_value() {
        let value = FallbackModel.predict_one(&features(30.0, 60.0, 8));
        let expected = 25_000.0 + 500.0 + 500.0 + 2000.0 * (PI / 3.0).sin();
        assert!((value - expected).abs() < 1e-9);
        assert!((value - 27_732.05).abs() < 0.01);
    }

    #[test]
    fn test_fallback_floor() {
        let value = FallbackModel.predict_one(&features(-40.0, 0.0, 18));
        assert_eq!(value, FallbackModel::FLOOR);
    }

    #[test]
    fn test_linear_regression_predict() {
        let model = LinearRegressionModel::new(vec![2.0, 3.0, 1.0], 5.0);
        // 2*1 + 3*2 + 1*3 + 5 = 16
        assert_eq!(model.predict_row(&[1.0, 2.0, 3.0]).unwrap(), 16.0);
        assert!(model.predict_row(&[1.0]).is_err());
    }

    #[test]
    fn test_missing_artifact_falls_back() {
        let model = DemandModel::load_or_fallback(Some(Path::new("/nonexistent/model.bin")));
        assert!(!model.is_loaded());
        assert_eq!(model.confidence(), FALLBACK_CONFIDENCE);
        assert_eq!(model.floor(), 15_000.0);

        let model = DemandModel::load_or_fallback(None);
        assert!(model.loaded().is_none());
    }

    proptest! {
        #[test]
        fn prop_fallback_is_pure_and_floored(
            t in -20.0f64..50.0,
            h in 0.0f64..100.0,
            hour in 0u32..24,
        ) {
            let obs = WeatherObservation {
                temperature: t,
                humidity: h,
                wind_speed: 3.0,
                cloud_cover: None,
                datetime: "2024-01-01T00:00:00".parse().unwrap(),
            };
            let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(hour, 0, 0).unwrap();
            let f = build_features(&obs, at);
            let a = FallbackModel.predict_one(&f);
            let b = FallbackModel.predict_one(&f);
            prop_assert_eq!(a.to_bits(), b.to_bits());
            prop_assert!(a >= FallbackModel::FLOOR);
        }
    }
}
