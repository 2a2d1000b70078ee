//! Router assembly for the module server HTTP API.
//!
//! [`build_router`] wires the handlers to their routes with CORS and
//! tracing middleware layers.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router.
///
/// Routes use axum 0.8 `/{param}` path syntax. Static prefixes take
/// precedence over the catch-all module routes, so `/health`, `/_js/...`,
/// `/_sourcemap/...`, and `/static/...` never parse as module names.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/_sourcemap/{modules}",
            get(handlers::modules::source_map),
        )
        .route(
            "/_sourcemap/{modules}/{held}",
            get(handlers::modules::source_map_with_held),
        )
        .route("/{modules}", get(handlers::modules::modules))
        .route(
            "/{modules}/{held}",
            get(handlers::modules::modules_with_held),
        )
        // Original sources for debuggers following `sourceRoot`.
        .nest_service("/_js", ServeDir::new(&state.config.source_dir));

    if let Some(static_dir) = &state.config.static_dir {
        router = router.nest_service("/static", ServeDir::new(static_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
