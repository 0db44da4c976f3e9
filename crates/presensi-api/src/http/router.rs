//! Axum router for the trigger surface.
//!
//! `POST /` and `POST /trigger` both start a run (the body, if any, is
//! ignored); any other method on those paths is a 405. `GET /health` is a
//! liveness probe. Middleware: request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the trigger router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::trigger::trigger_run))
        .route("/trigger", post(handlers::trigger::trigger_run))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - liveness probe, no run side effects.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
