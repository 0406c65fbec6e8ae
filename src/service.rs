use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::config::Config;
use crate::forecast::historical::HistoricalReader;
use crate::ml::DemandModel;

/// Immutable state shared by every request handler.
///
/// The model is chosen once here and never swapped; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub model: Arc<DemandModel>,
    pub historical: HistoricalReader,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let model = DemandModel::load_or_fallback(cfg.model.artifact_path.as_deref());
        Self::with_model(cfg, model)
    }

    pub fn with_model(cfg: Config, model: DemandModel) -> Self {
        let historical = HistoricalReader::new(
            cfg.data.historical_csv_path.clone(),
            cfg.data.synthetic_total_records,
        );
        info!(
            model_loaded = model.is_loaded(),
            historical_csv = %historical.path().display(),
            "service state ready"
        );
        Self {
            cfg: Arc::new(cfg),
            model: Arc::new(model),
            historical,
        }
    }

    /// Noise source for one request's synthetic data.
    ///
    /// A configured seed makes every request reproducible; otherwise entropy.
    pub fn noise_rng(&self) -> StdRng {
        match self.cfg.weather.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_new_without_artifact_is_fallback() {
        let state = AppState::new(Config::default());
        assert!(!state.model.is_loaded());
        assert_eq!(state.model.confidence(), 0.60);
    }

    #[test]
    fn test_missing_artifact_is_fallback() {
        let mut cfg = Config::default();
        cfg.model.artifact_path = Some("/no/such/model.bin".into());
        assert!(!AppState::new(cfg).model.is_loaded());
    }

    #[test]
    fn test_seeded_noise_repeats() {
        let mut cfg = Config::default();
        cfg.weather.seed = Some(5);
        let state = AppState::new(cfg);
        let a: u64 = state.noise_rng().gen();
        let b: u64 = state.noise_rng().gen();
        assert_eq!(a, b);
    }
}
