//! Module payload and source map handlers.
//!
//! Path segments carry comma-separated module names; the optional second
//! segment lists modules the client already holds. Names arrive
//! percent-decoded from the path extractor.

use axum::body::Body;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use modserver_bundle::ModuleRequest;

use crate::error::ApiError;
use crate::state::AppState;

const JAVASCRIPT: &str = "application/javascript; charset=utf-8";
const JSON: &str = "application/json; charset=utf-8";

/// Serves the payload for a set of modules.
///
/// `GET /{modules}`
pub async fn modules(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(modules): Path<String>,
) -> Result<Response, ApiError> {
    payload(&state, uri.path(), ModuleRequest::new(split_names(&modules))).await
}

/// Serves the payload for a set of modules, leaving out what the client holds.
///
/// `GET /{modules}/{held}`
pub async fn modules_with_held(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((modules, held)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let request = ModuleRequest::new(split_names(&modules)).with_held(split_names(&held));
    payload(&state, uri.path(), request).await
}

/// Serves the sectioned source map for a payload request.
///
/// `GET /_sourcemap/{modules}`
pub async fn source_map(
    State(state): State<AppState>,
    Path(modules): Path<String>,
) -> Result<Response, ApiError> {
    sectioned_map(&state, ModuleRequest::new(split_names(&modules))).await
}

/// `GET /_sourcemap/{modules}/{held}`
pub async fn source_map_with_held(
    State(state): State<AppState>,
    Path((modules, held)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let request = ModuleRequest::new(split_names(&modules)).with_held(split_names(&held));
    sectioned_map(&state, request).await
}

async fn payload(state: &AppState, path: &str, request: ModuleRequest) -> Result<Response, ApiError> {
    let server = state.server().await?;
    let payload = server.serve(&request, &state.assemble_options(false))?;

    let map_url = HeaderValue::from_str(&format!("/_sourcemap{}", path))
        .map_err(|e| ApiError::InternalError(format!("invalid source map URL: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(JAVASCRIPT)),
            (header::CONTENT_LENGTH, HeaderValue::from(payload.byte_length)),
            (header::HeaderName::from_static("sourcemap"), map_url.clone()),
            (header::HeaderName::from_static("x-sourcemap"), map_url),
        ],
        Body::from(payload.source),
    )
        .into_response())
}

async fn sectioned_map(state: &AppState, request: ModuleRequest) -> Result<Response, ApiError> {
    let server = state.server().await?;
    let payload = server.serve(&request, &state.assemble_options(true))?;
    let map = payload
        .source_map
        .ok_or_else(|| ApiError::InternalError("source map was not built".to_string()))?;
    let body = serde_json::to_string_pretty(&map)
        .map_err(|e| ApiError::InternalError(format!("failed to encode source map: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(JSON)),
            (header::PRAGMA, HeaderValue::from_static("no-cache")),
        ],
        body,
    )
        .into_response())
}

/// Splits a comma-separated path segment, dropping empty entries.
fn split_names(segment: &str) -> Vec<String> {
    segment
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
