use serde::Serialize;

use super::BlockTime;

/// Length of one prediction block in minutes.
pub const BLOCK_MINUTES: i64 = 10;
/// Blocks in a 24-hour forecast.
pub const BLOCKS_PER_DAY: usize = 96;

/// Predicted consumption for one 10-minute block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionBlock {
    pub start_time: BlockTime,
    pub value: f64,
}

/// A full 24-hour series together with the fixed confidence of the model that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    pub blocks: Vec<PredictionBlock>,
    pub confidence: f64,
}

impl ForecastSummary {
    pub fn values(&self) -> Vec<f64> {
        self.blocks.iter().map(|b| b.value).collect()
    }
}
