use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ApiError;
use crate::forecast::holidays::{holidays, HolidayCategory, HOLIDAY_YEAR};
use crate::service::AppState;

#[derive(Debug, Deserialize)]
pub struct HolidayQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct HolidayEntry {
    pub date: String,
    pub name: &'static str,
    pub category: HolidayCategory,
    pub is_holiday: bool,
}

#[derive(Debug, Serialize)]
pub struct HolidayResponse {
    pub holidays: Vec<HolidayEntry>,
    pub location: String,
    pub total_holidays: usize,
}

/// GET /holidays - The embedded holiday table
///
/// Only one year is embedded, so `year` does not change the result.
pub async fn get_holidays(
    State(st): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<HolidayQuery>, ApiError>,
) -> Json<HolidayResponse> {
    if let Some(year) = q.year.filter(|y| *y != HOLIDAY_YEAR) {
        debug!(year, embedded = HOLIDAY_YEAR, "holiday year not embedded; serving default table");
    }

    let holidays: Vec<HolidayEntry> = holidays()
        .iter()
        .map(|h| HolidayEntry {
            date: h.date_string(),
            name: h.name,
            category: h.category,
            is_holiday: true,
        })
        .collect();

    Json(HolidayResponse {
        total_holidays: holidays.len(),
        holidays,
        location: st.cfg.site.location.clone(),
    })
}
