//! SmartCore RandomForest Wrapper
//!
//! Wraps SmartCore's `RandomForestRegressor` so it can be stored inside a
//! [`ModelArtifact`](super::ModelArtifact) and served one row at a time.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::models::Regressor;
use super::ModelError;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Trained random forest plus the parameters it was fit with
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForestModel {
    model: Forest,
    n_features: usize,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
}

impl RandomForestModel {
    /// Default training parameters
    ///
    /// - 100 trees
    /// - Max depth 12
    /// - Min samples split 5
    pub fn default_parameters() -> RandomForestRegressorParameters {
        Self::custom_parameters(100, Some(12), 5, 42)
    }

    pub fn custom_parameters(
        n_trees: usize,
        max_depth: Option<usize>,
        min_samples_split: usize,
        seed: u64,
    ) -> RandomForestRegressorParameters {
        RandomForestRegressorParameters {
            max_depth: max_depth.map(|d| d as u16),
            min_samples_leaf: 1,
            min_samples_split,
            n_trees,
            m: None,             // sqrt(n_features)
            keep_samples: false, // samples are not needed for prediction
            seed,
        }
    }

    /// Fit a forest on row-major `x` against `y`.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: RandomForestRegressorParameters) -> Result<Self> {
        if x.is_empty() || y.is_empty() {
            anyhow::bail!("Cannot train on empty dataset");
        }

        if x.len() != y.len() {
            anyhow::bail!(
                "Feature and target count mismatch: {} features, {} targets",
                x.len(),
                y.len()
            );
        }

        let n_trees = params.n_trees;
        let max_depth = params.max_depth.map(|d| d as usize);

        let n_samples = x.len();
        let n_features = x[0].len();

        let mut flat_data = Vec::with_capacity(n_samples * n_features);
        for row in x {
            if row.len() != n_features {
                anyhow::bail!("All feature vectors must have the same length");
            }
            flat_data.extend_from_slice(row);
        }

        let x_matrix = DenseMatrix::new(n_samples, n_features, flat_data, false);
        let y_vec = y.to_vec();

        let model = RandomForestRegressor::fit(&x_matrix, &y_vec, params)
            .map_err(|e| anyhow::anyhow!("RandomForest training failed: {:?}", e))?;

        Ok(Self {
            model,
            n_features,
            n_trees,
            max_depth,
        })
    }
}

impl Regressor for RandomForestModel {
    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let x = DenseMatrix::new(1, row.len(), row.to_vec(), false);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| ModelError::Prediction(format!("{:?}", e)))?;

        predictions.first().copied().ok_or(ModelError::EmptyPrediction)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
