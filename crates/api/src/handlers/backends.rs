use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use gslb_domain::GslbError;

use crate::dto::{BulkBackendRequest, BulkBackendResponse};
use crate::state::AppState;

/// POST /api/backends/disable
pub async fn disable_backends(
    state: State<AppState>,
    body: Result<Json<BulkBackendRequest>, JsonRejection>,
) -> Response {
    set_backends_enable(state, body, false).await
}

/// POST /api/backends/enable
pub async fn enable_backends(
    state: State<AppState>,
    body: Result<Json<BulkBackendRequest>, JsonRejection>,
) -> Response {
    set_backends_enable(state, body, true).await
}

async fn set_backends_enable(
    State(state): State<AppState>,
    body: Result<Json<BulkBackendRequest>, JsonRejection>,
    enable: bool,
) -> Response {
    let Ok(Json(request)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid JSON"})),
        )
            .into_response();
    };

    let criteria = request.into_criteria();
    let zone_files = state.registry.zone_files();

    match state
        .bulk_backends
        .execute(&zone_files, &criteria, enable)
        .await
    {
        Ok(backends) => Json(BulkBackendResponse {
            success: true,
            backends,
        })
        .into_response(),
        Err(GslbError::ConfigValidation(message)) => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
        }
        Err(e) => {
            error!(error = %e, enable, "Bulk backend update failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
