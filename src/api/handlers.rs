//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{DailyQuery, ErrorResponse};
use crate::audit::report::ReportData;
use crate::audit::types::{DailyRollup, HourlyBucket};

/// `GET /report` → 200 + `ReportData` JSON
pub async fn get_report(State(state): State<Arc<AppState>>) -> Json<ReportData> {
    Json(state.run.report.clone())
}

/// Returns the KPI set.
///
/// `GET /kpis` → 200 + `KpiSet` JSON
/// `GET /kpis` on a run without data → 404 + `ErrorResponse`
pub async fn get_kpis(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.run.kpis {
        Some(kpis) => Ok(Json(kpis.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no valid readings in this run".to_string(),
            }),
        )),
    }
}

/// Returns daily rollups, optionally filtered by date range.
///
/// `GET /daily` → 200 + `Vec<DailyRollup>` JSON
/// `GET /daily?from=2024-03-01&to=2024-03-02` → filtered range (inclusive)
/// `GET /daily?from=2024-03-05&to=2024-03-01` → 400 + `ErrorResponse`
pub async fn get_daily(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyQuery>,
) -> impl IntoResponse {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("`from` ({from}) must be <= `to` ({to})"),
                }),
            ));
        }
    }

    let days: Vec<DailyRollup> = state
        .run
        .kpis
        .iter()
        .flat_map(|k| k.daily.iter())
        .filter(|d| query.contains(&d.day))
        .cloned()
        .collect();

    Ok(Json(days))
}

/// `GET /hourly` → 200 + `Vec<HourlyBucket>` JSON, empty when there is no data
pub async fn get_hourly(State(state): State<Arc<AppState>>) -> Json<Vec<HourlyBucket>> {
    Json(
        state
            .run
            .kpis
            .as_ref()
            .map(|k| k.hourly_profile.clone())
            .unwrap_or_default(),
    )
}
