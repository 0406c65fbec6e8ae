//! Serialized model artifacts
//!
//! An artifact bundles the estimator with the feature schema it was fit on, so
//! a model trained against a different column layout is refused at load time
//! instead of silently producing wrong numbers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{Estimator, Regressor};
use super::{FeatureScaler, ModelMetadata};
use crate::forecast::features::FeatureSchema;

/// Bumped whenever the on-disk layout of [`ModelArtifact`] changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to access model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model artifact: {0}")]
    Decode(#[source] bincode::Error),

    #[error("failed to encode model artifact: {0}")]
    Encode(#[source] bincode::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("feature schema mismatch: artifact has v{found_version} {found:?}, builder produces v{expected_version} {expected:?}")]
    SchemaMismatch {
        expected_version: u32,
        expected: Vec<String>,
        found_version: u32,
        found: Vec<String>,
    },

    #[error("{component} expects {actual} features but the schema has {expected}")]
    WidthMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Estimator plus everything needed to feed it correctly
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema: FeatureSchema,
    pub metadata: ModelMetadata,
    pub scaler: Option<FeatureScaler>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// New artifact for the current feature schema.
    pub fn new(metadata: ModelMetadata, scaler: Option<FeatureScaler>, estimator: Estimator) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema: FeatureSchema::current(),
            metadata,
            scaler,
            estimator,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ArtifactError::NotFound(path.to_path_buf()),
            _ => ArtifactError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        bincode::deserialize(&bytes).map_err(ArtifactError::Decode)
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let bytes = bincode::serialize(self).map_err(ArtifactError::Encode)?;
        fs::write(path, bytes).map_err(|e| ArtifactError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check the artifact against the feature builder's schema.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedFormat {
                found: self.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        let expected = FeatureSchema::current();
        if self.schema != expected {
            return Err(ArtifactError::SchemaMismatch {
                expected_version: expected.version,
                expected: expected.columns,
                found_version: self.schema.version,
                found: self.schema.columns.clone(),
            });
        }

        if let Some(scaler) = &self.scaler {
            if scaler.len() != expected.len() || scaler.stds.len() != expected.len() {
                return Err(ArtifactError::WidthMismatch {
                    component: "scaler",
                    expected: expected.len(),
                    actual: scaler.len(),
                });
            }
        }

        // Linear models are left to fail per request, the way a mis-shaped
        // estimator would surface at predict time.
        if let Estimator::RandomForest(forest) = &self.estimator {
            if forest.n_features() != expected.len() {
                return Err(ArtifactError::WidthMismatch {
                    component: "estimator",
                    expected: expected.len(),
                    actual: forest.n_features(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::features::FEATURE_COUNT;
    use crate::ml::{LinearRegressionModel, ModelType, ValidationMetrics};

    fn metadata() -> ModelMetadata {
        ModelMetadata {
            model_id: "test_linear".to_string(),
            model_type: ModelType::LinearRegression,
            version: "0.1.0".to_string(),
            trained_at: chrono::Utc::now(),
            training_samples: 100,
            validation_metrics: ValidationMetrics::new(0.5, 0.7, 5.0, 0.85),
            feature_names: FeatureSchema::current().columns,
            target: "F1_132KV_PowerConsumption".to_string(),
        }
    }

    fn linear_artifact() -> ModelArtifact {
        ModelArtifact::new(
            metadata(),
            None,
            Estimator::Linear(LinearRegressionModel::new(vec![1.0; FEATURE_COUNT], 100.0)),
        )
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        linear_artifact().save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();

        assert_eq!(loaded.metadata.model_id, "test_linear");
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = ModelArtifact::load(Path::new("/definitely/not/here.bin")).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn test_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        fs::write(&path, b"\x80\x04\x95 not a bincode artifact").unwrap();

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Decode(_)));
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let mut artifact = linear_artifact();
        artifact.schema.columns = vec!["Temperature".into(), "Humidity".into(), "WindSpeed".into()];
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let mut artifact = linear_artifact();
        artifact.schema.columns.swap(4, 5);
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_format_version_rejected() {
        let mut artifact = linear_artifact();
        artifact.format_version = 99;
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::UnsupportedFormat { found: 99, .. })
        ));
    }

    #[test]
    fn test_scaler_width_rejected() {
        let mut artifact = linear_artifact();
        artifact.scaler = Some(FeatureScaler {
            means: vec![0.0; 3],
            stds: vec![1.0; 3],
        });
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::WidthMismatch { component: "scaler", .. })
        ));
    }
}
