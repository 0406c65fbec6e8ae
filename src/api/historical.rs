use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{error::ApiError, now_local};
use crate::forecast::historical::HistoricalRow;
use crate::service::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct HistoricalQuery {
    #[serde(default = "default_limit")]
    #[validate(range(max = 10000))]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Serialize)]
pub struct HistoricalDataResponse {
    pub data: Vec<HistoricalRow>,
    pub total_records: usize,
}

/// GET /historical-data?limit=L&offset=O
pub async fn get_historical_data(
    State(st): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<HistoricalQuery>, ApiError>,
) -> Result<Json<HistoricalDataResponse>, ApiError> {
    q.validate()?;

    let reader = st.historical.clone();
    let mut rng = st.noise_rng();
    let now = now_local().local();
    let page = tokio::task::spawn_blocking(move || reader.read_page(q.limit, q.offset, now, &mut rng)).await?;

    tracing::debug!(source = ?page.source, returned = page.data.len(), "historical data served");
    Ok(Json(HistoricalDataResponse {
        data: page.data,
        total_records: page.total_records,
    }))
}
