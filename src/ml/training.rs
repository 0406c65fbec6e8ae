//! Model Training
//!
//! Fits a random forest on historical feeder consumption and packages it as a
//! [`ModelArtifact`]. Training runs offline; the service only ever loads the
//! resulting file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::artifact::ModelArtifact;
use super::models::{Estimator, Regressor};
use super::smartcore::RandomForestModel;
use super::{FeatureScaler, ModelMetadata, ModelType, ValidationMetrics};
use crate::domain::WeatherObservation;
use crate::forecast::features::{build_features, DemandFeatures, FeatureSchema};
use crate::forecast::historical::{Feeder, HistoricalRecord};

/// Training Dataset
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    pub features: Vec<DemandFeatures>,
    pub targets: Vec<f64>,
}

impl TrainingDataset {
    pub fn new(features: Vec<DemandFeatures>, targets: Vec<f64>) -> Result<Self> {
        if features.len() != targets.len() {
            anyhow::bail!(
                "Feature and target count mismatch: {} features, {} targets",
                features.len(),
                targets.len()
            );
        }
        Ok(Self { features, targets })
    }

    /// Build features for every record, using `feeder` as the target.
    pub fn from_history(records: &[HistoricalRecord], feeder: Feeder) -> Result<Self> {
        let mut features = Vec::with_capacity(records.len());
        let mut targets = Vec::with_capacity(records.len());

        for record in records {
            let observation = WeatherObservation {
                temperature: record.temperature,
                humidity: record.humidity,
                wind_speed: record.wind_speed,
                cloud_cover: None,
                datetime: record.datetime,
            };
            features.push(build_features(&observation, record.datetime.local()));
            targets.push(record.consumption(feeder));
        }

        Self::new(features, targets)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.features.iter().map(|f| f.to_row().to_vec()).collect()
    }

    /// Split dataset into training and validation sets, preserving order
    pub fn split(&self, train_ratio: f64) -> Result<(TrainingDataset, TrainingDataset)> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            anyhow::bail!("Train ratio must be between 0 and 1");
        }

        let split_idx = (self.len() as f64 * train_ratio).floor() as usize;

        let train = TrainingDataset {
            features: self.features[..split_idx].to_vec(),
            targets: self.targets[..split_idx].to_vec(),
        };

        let val = TrainingDataset {
            features: self.features[split_idx..].to_vec(),
            targets: self.targets[split_idx..].to_vec(),
        };

        Ok((train, val))
    }
}

/// Training Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub validation_split: f64,
    pub standardize: bool,
    pub seed: u64,
    pub feeder: Feeder,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: Some(12),
            min_samples_split: 5,
            validation_split: 0.2,
            standardize: false,
            seed: 42,
            feeder: Feeder::F1,
        }
    }
}

/// Model Trainer
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Calculate validation metrics
    pub fn calculate_metrics(&self, predictions: &[f64], targets: &[f64]) -> Result<ValidationMetrics> {
        if predictions.len() != targets.len() {
            anyhow::bail!("Prediction and target count mismatch");
        }

        if predictions.is_empty() {
            anyhow::bail!("No predictions to evaluate");
        }

        let n = predictions.len() as f64;

        let mae: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).abs())
            .sum::<f64>()
            / n;

        let mse: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / n;
        let rmse = mse.sqrt();

        let mape: f64 = predictions
            .iter()
            .zip(targets.iter())
            .filter(|(_, t)| t.abs() > 1e-10)
            .map(|(p, t)| ((p - t) / t).abs() * 100.0)
            .sum::<f64>()
            / n;

        let mean_target: f64 = targets.iter().sum::<f64>() / n;
        let ss_tot: f64 = targets.iter().map(|t| (t - mean_target).powi(2)).sum();
        let ss_res: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (t - p).powi(2))
            .sum();

        let r2 = if ss_tot.abs() < 1e-10 {
            0.0
        } else {
            1.0 - (ss_res / ss_tot)
        };

        Ok(ValidationMetrics::new(mae, rmse, mape, r2))
    }

    /// Fit a random forest and evaluate it on the held-out tail of the dataset.
    pub fn train_random_forest(&self, dataset: &TrainingDataset) -> Result<ModelArtifact> {
        if dataset.len() < 2 {
            anyhow::bail!("Need at least two samples to train and validate");
        }

        let (train, val) = dataset.split(1.0 - self.config.validation_split)?;
        if train.is_empty() || val.is_empty() {
            anyhow::bail!("Validation split left an empty partition");
        }

        let train_rows = train.rows();
        let scaler = if self.config.standardize {
            FeatureScaler::fit(&train_rows)
        } else {
            None
        };
        let scale = |rows: Vec<Vec<f64>>| -> Result<Vec<Vec<f64>>> {
            match &scaler {
                Some(s) => rows
                    .iter()
                    .map(|r| s.transform(r).map_err(anyhow::Error::from))
                    .collect(),
                None => Ok(rows),
            }
        };

        let params = RandomForestModel::custom_parameters(
            self.config.n_trees,
            self.config.max_depth,
            self.config.min_samples_split,
            self.config.seed,
        );
        let forest = RandomForestModel::fit(&scale(train_rows)?, &train.targets, params)?;

        let predictions = scale(val.rows())?
            .iter()
            .map(|r| forest.predict_row(r))
            .collect::<Result<Vec<f64>, _>>()?;
        let metrics = self.calculate_metrics(&predictions, &val.targets)?;

        info!(
            samples = train.len(),
            validation_samples = val.len(),
            mae = metrics.mae,
            r2 = metrics.r2,
            "random forest trained"
        );

        let metadata = ModelMetadata {
            model_id: format!("rf_{}", uuid::Uuid::new_v4()),
            model_type: ModelType::RandomForest,
            version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: chrono::Utc::now(),
            training_samples: train.len(),
            validation_metrics: metrics,
            feature_names: FeatureSchema::current().columns,
            target: self.config.feeder.column().to_string(),
        };

        Ok(ModelArtifact::new(metadata, scaler, Estimator::RandomForest(forest)))
    }

    /// Build the dataset from historical records and train on it.
    pub fn train_from_history(&self, records: &[HistoricalRecord]) -> Result<ModelArtifact> {
        let dataset = TrainingDataset::from_history(records, self.config.feeder)?;
        self.train_random_forest(&dataset)
    }
}
