use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::json;
use tracing::debug;

use gslb_domain::normalize_fqdn;

use crate::dto::RecordStatus;
use crate::state::AppState;

/// GET /api/overview: every zone with its records and backends.
pub async fn get_overview(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, Vec<RecordStatus>>> {
    let overview = state.registry.overview().await;
    let response: BTreeMap<String, Vec<RecordStatus>> = overview
        .iter()
        .map(|(zone, records)| {
            (
                zone.clone(),
                records.iter().map(RecordStatus::from_view).collect(),
            )
        })
        .collect();
    debug!(zones = response.len(), "Overview retrieved");
    Json(response)
}

/// GET /api/overview/{zone}: one zone, 404 when it is not configured.
pub async fn get_zone_overview(
    State(state): State<AppState>,
    Path(zone): Path<String>,
) -> Result<Json<Vec<RecordStatus>>, (StatusCode, Json<serde_json::Value>)> {
    let zone = normalize_fqdn(&zone);
    match state.registry.zone_overview(&zone).await {
        Some(records) => Ok(Json(records.iter().map(RecordStatus::from_view).collect())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Zone not found"})),
        )),
    }
}
