use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::require_basic_auth;
use crate::state::AppState;

/// Creates all API routes with state. Unsupported methods on known
/// paths answer 405 with a JSON error.
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/overview",
            get(handlers::overview::get_overview).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/overview/:zone",
            get(handlers::overview::get_zone_overview).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/backends/disable",
            post(handlers::backends::disable_backends).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/backends/enable",
            post(handlers::backends::enable_backends).fallback(handlers::method_not_allowed),
        )
        .route("/metrics", get(handlers::metrics::render_metrics))
        .layer(from_fn_with_state(state.clone(), require_basic_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
