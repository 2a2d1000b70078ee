//! Readiness handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::schema::health::HealthResponse;
use crate::state::{AppState, Readiness};

/// Reports whether module artifacts are loaded.
///
/// `GET /health` -- `200` when ready, `503` while loading or after a failure.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.readiness().await {
        Readiness::Ready(server) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready",
                modules: Some(server.graph().len()),
                error: None,
            }),
        ),
        Readiness::Loading => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "loading",
                modules: None,
                error: None,
            }),
        ),
        Readiness::Failed(message) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "failed",
                modules: None,
                error: Some(message),
            }),
        ),
    }
}
